//! Fixed vocabulary of `$` system variables
//!
//! System variables are populated from the frame configuration and the
//! geometry solver before any template is resolved. Templates can read them
//! but profiles can never declare or override them.

use std::fmt;

/// Highest index accepted for indexed system variables (hinges and PMs)
pub const MAX_INDEXED: u8 = 4;

/// A variable from the fixed `$` vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemVar {
    // Frame level
    FrameHeight,
    FrameWidth,
    DoorWidth,
    /// Text value `left` or `right`
    Orientation,
    /// 1 for left doors (offsets measured from the mirrored edge), 0 otherwise
    Mirrored,
    MachineXOffset,
    MachineYOffset,
    MachineZOffset,
    LockPosition,
    LockYOffset,
    LockActive,
    /// 1-based machining position of the lock, 0 when unordered
    LockOrder,
    HingeCount,
    HingeYOffset,
    HingePosition(u8),
    HingeActive(u8),
    HingeOrder(u8),
    PmPosition(u8),

    // Instance level
    /// Offset of the current instance from the reference edge
    Position,
    /// Position of the current instance in unmirrored frame coordinates
    FramePosition,
    ClearanceStart,
    ClearanceEnd,
    Index,
    YOffset,
}

impl SystemVar {
    /// Look up a system variable by its name (without the `$` sigil)
    pub fn from_name(name: &str) -> Option<Self> {
        let var = match name {
            "frame_height" => Self::FrameHeight,
            "frame_width" => Self::FrameWidth,
            "door_width" => Self::DoorWidth,
            "orientation" => Self::Orientation,
            "mirrored" => Self::Mirrored,
            "machine_x_offset" => Self::MachineXOffset,
            "machine_y_offset" => Self::MachineYOffset,
            "machine_z_offset" => Self::MachineZOffset,
            "lock_position" => Self::LockPosition,
            "lock_y_offset" => Self::LockYOffset,
            "lock_active" => Self::LockActive,
            "lock_order" => Self::LockOrder,
            "hinge_count" => Self::HingeCount,
            "hinge_y_offset" => Self::HingeYOffset,
            "position" => Self::Position,
            "frame_position" => Self::FramePosition,
            "clearance_start" => Self::ClearanceStart,
            "clearance_end" => Self::ClearanceEnd,
            "index" => Self::Index,
            "y_offset" => Self::YOffset,
            _ => {
                if let Some(n) = indexed(name, "hinge", "_position") {
                    Self::HingePosition(n)
                } else if let Some(n) = indexed(name, "hinge", "_active") {
                    Self::HingeActive(n)
                } else if let Some(n) = indexed(name, "hinge", "_order") {
                    Self::HingeOrder(n)
                } else if let Some(n) = indexed(name, "pm", "_position") {
                    Self::PmPosition(n)
                } else {
                    return None;
                }
            }
        };
        Some(var)
    }

    /// Whether the variable describes the instance being generated rather than the frame
    pub fn is_instance_scoped(&self) -> bool {
        matches!(
            self,
            Self::Position
                | Self::FramePosition
                | Self::ClearanceStart
                | Self::ClearanceEnd
                | Self::Index
                | Self::YOffset
        )
    }

    /// Every frame-level variable, in the order the variables dialog lists them
    pub fn frame_vocabulary() -> Vec<SystemVar> {
        let mut vars = vec![
            Self::FrameHeight,
            Self::FrameWidth,
            Self::DoorWidth,
            Self::Orientation,
            Self::Mirrored,
            Self::MachineXOffset,
            Self::MachineYOffset,
            Self::MachineZOffset,
            Self::LockPosition,
            Self::LockYOffset,
            Self::LockActive,
            Self::LockOrder,
            Self::HingeCount,
            Self::HingeYOffset,
        ];
        for n in 1..=MAX_INDEXED {
            vars.push(Self::HingePosition(n));
            vars.push(Self::HingeActive(n));
            vars.push(Self::HingeOrder(n));
        }
        for n in 1..=MAX_INDEXED {
            vars.push(Self::PmPosition(n));
        }
        vars
    }
}

/// Parse `<prefix><n><suffix>` with `n` in `1..=MAX_INDEXED`, no leading zeros
fn indexed(name: &str, prefix: &str, suffix: &str) -> Option<u8> {
    let digits = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits
        .parse::<u8>()
        .ok()
        .filter(|n| (1..=MAX_INDEXED).contains(n))
}

impl fmt::Display for SystemVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameHeight => f.write_str("frame_height"),
            Self::FrameWidth => f.write_str("frame_width"),
            Self::DoorWidth => f.write_str("door_width"),
            Self::Orientation => f.write_str("orientation"),
            Self::Mirrored => f.write_str("mirrored"),
            Self::MachineXOffset => f.write_str("machine_x_offset"),
            Self::MachineYOffset => f.write_str("machine_y_offset"),
            Self::MachineZOffset => f.write_str("machine_z_offset"),
            Self::LockPosition => f.write_str("lock_position"),
            Self::LockYOffset => f.write_str("lock_y_offset"),
            Self::LockActive => f.write_str("lock_active"),
            Self::LockOrder => f.write_str("lock_order"),
            Self::HingeCount => f.write_str("hinge_count"),
            Self::HingeYOffset => f.write_str("hinge_y_offset"),
            Self::HingePosition(n) => write!(f, "hinge{}_position", n),
            Self::HingeActive(n) => write!(f, "hinge{}_active", n),
            Self::HingeOrder(n) => write!(f, "hinge{}_order", n),
            Self::PmPosition(n) => write!(f, "pm{}_position", n),
            Self::Position => f.write_str("position"),
            Self::FramePosition => f.write_str("frame_position"),
            Self::ClearanceStart => f.write_str("clearance_start"),
            Self::ClearanceEnd => f.write_str("clearance_end"),
            Self::Index => f.write_str("index"),
            Self::YOffset => f.write_str("y_offset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_names() {
        assert_eq!(SystemVar::from_name("frame_height"), Some(SystemVar::FrameHeight));
        assert_eq!(SystemVar::from_name("lock_y_offset"), Some(SystemVar::LockYOffset));
        assert_eq!(SystemVar::from_name("nope"), None);
    }

    #[test]
    fn test_indexed_names() {
        assert_eq!(
            SystemVar::from_name("hinge3_position"),
            Some(SystemVar::HingePosition(3))
        );
        assert_eq!(SystemVar::from_name("hinge2_active"), Some(SystemVar::HingeActive(2)));
        assert_eq!(SystemVar::from_name("pm4_position"), Some(SystemVar::PmPosition(4)));
        assert_eq!(SystemVar::from_name("hinge4_order"), Some(SystemVar::HingeOrder(4)));
        assert_eq!(SystemVar::from_name("lock_order"), Some(SystemVar::LockOrder));
        assert_eq!(SystemVar::from_name("pm1_order"), None);
        assert_eq!(SystemVar::from_name("pm5_position"), None);
        assert_eq!(SystemVar::from_name("hinge0_position"), None);
        assert_eq!(SystemVar::from_name("hinge01_position"), None);
        assert_eq!(SystemVar::from_name("hinge_position"), None);
    }

    #[test]
    fn test_display_round_trips_vocabulary() {
        for var in SystemVar::frame_vocabulary() {
            assert_eq!(SystemVar::from_name(&var.to_string()), Some(var));
        }
        assert!(SystemVar::Position.is_instance_scoped());
        assert!(!SystemVar::FrameHeight.is_instance_scoped());
    }
}
