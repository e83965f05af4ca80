//! Frame requests and placed component instances

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of hardware cut into the frame
///
/// The declaration order is the batch order: the frame program, hinges, then
/// the lock, then PMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentClass {
    /// Whole-frame program, never placed by the solver
    Frame,
    Hinge,
    Lock,
    /// Mounting point
    Pm,
}

impl ComponentClass {
    pub fn name(&self) -> &'static str {
        match self {
            ComponentClass::Frame => "frame",
            ComponentClass::Hinge => "hinge",
            ComponentClass::Lock => "lock",
            ComponentClass::Pm => "pm",
        }
    }

    /// Maximum number of instances per frame
    pub fn max_count(&self) -> usize {
        match self {
            ComponentClass::Hinge | ComponentClass::Pm => 4,
            ComponentClass::Frame | ComponentClass::Lock => 1,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "frame" => Some(ComponentClass::Frame),
            "hinge" => Some(ComponentClass::Hinge),
            "lock" => Some(ComponentClass::Lock),
            "pm" => Some(ComponentClass::Pm),
            _ => None,
        }
    }

    /// Whether two classes sit on a common jamb and can therefore collide
    ///
    /// Hinges use the hinge jamb, the lock uses the lock jamb and mounting
    /// points are cut into both. The frame program has no footprint.
    pub fn shares_jamb(&self, other: ComponentClass) -> bool {
        use ComponentClass::*;
        !matches!(
            (self, other),
            (Frame, _) | (_, Frame) | (Hinge, Lock) | (Lock, Hinge)
        )
    }
}

impl fmt::Display for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Door handing; selects the edge positions are measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Left,
    #[default]
    Right,
}

impl Orientation {
    pub fn name(&self) -> &'static str {
        match self {
            Orientation::Left => "left",
            Orientation::Right => "right",
        }
    }

    pub fn is_mirrored(&self) -> bool {
        matches!(self, Orientation::Left)
    }

    /// Convert between frame coordinates and offsets from the reference edge
    ///
    /// The mapping is its own inverse.
    pub fn mirror(&self, value: f64, height: f64) -> f64 {
        match self {
            Orientation::Left => height - value,
            Orientation::Right => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    Manual,
    #[default]
    Auto,
}

/// Profile name for a whole class, or one entry per index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileAssignment {
    Single(String),
    PerInstance(Vec<Option<String>>),
}

impl ProfileAssignment {
    /// Profile for the `index`-th (1-based) instance
    pub fn for_index(&self, index: usize) -> Option<&str> {
        match self {
            ProfileAssignment::Single(name) => Some(name.as_str()),
            ProfileAssignment::PerInstance(names) => names
                .get(index.checked_sub(1)?)
                .and_then(|name| name.as_deref()),
        }
    }
}

impl From<&str> for ProfileAssignment {
    fn from(name: &str) -> Self {
        ProfileAssignment::Single(name.to_string())
    }
}

/// Request for hinges or mounting points
///
/// `positions` are offsets from the reference edge; `None` entries are free
/// and placed automatically.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRequest {
    #[serde(default)]
    pub mode: PlacementMode,
    #[serde(default)]
    pub positions: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileAssignment>,
}

impl ComponentRequest {
    /// `count` automatically placed components
    pub fn auto(count: usize) -> Self {
        Self {
            mode: PlacementMode::Auto,
            count: Some(count),
            ..Self::default()
        }
    }

    /// Components pinned at the given offsets
    pub fn manual(positions: &[f64]) -> Self {
        Self {
            mode: PlacementMode::Manual,
            positions: positions.iter().copied().map(Some).collect(),
            ..Self::default()
        }
    }

    /// Automatic placement with some positions pinned
    pub fn mixed(positions: Vec<Option<f64>>) -> Self {
        Self {
            mode: PlacementMode::Auto,
            positions,
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, profile: impl Into<ProfileAssignment>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Number of components requested
    pub fn requested(&self) -> usize {
        self.count.unwrap_or(self.positions.len())
    }

    /// One slot per requested component: `Some` pinned, `None` free
    pub fn slots(&self) -> Vec<Option<f64>> {
        let mut slots = self.positions.clone();
        slots.resize(self.requested(), None);
        slots
    }
}

/// Request for the single lock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    #[serde(default)]
    pub mode: PlacementMode,
    /// Offset from the reference edge, required in manual mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

fn default_true() -> bool {
    true
}

impl LockRequest {
    pub fn auto() -> Self {
        Self {
            mode: PlacementMode::Auto,
            position: None,
            active: true,
            profile: None,
        }
    }

    pub fn manual(position: f64) -> Self {
        Self {
            mode: PlacementMode::Manual,
            position: Some(position),
            ..Self::auto()
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

/// Machine origin offset written to `$machine_*_offset`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MachineOffset {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Whole-frame program for each door handing, by profile name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FramePrograms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
}

impl FramePrograms {
    pub fn for_orientation(&self, orientation: Orientation) -> Option<&str> {
        match orientation {
            Orientation::Right => self.right.as_deref(),
            Orientation::Left => self.left.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.right.is_none() && self.left.is_none()
    }
}

/// Frame dimensions and component requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameConfig {
    pub height: f64,
    pub width: f64,
    pub door_width: f64,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub machine_offset: MachineOffset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_y_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hinge_y_offset: Option<f64>,
    #[serde(default)]
    pub hinges: ComponentRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockRequest>,
    #[serde(default)]
    pub pm_positions: ComponentRequest,
    #[serde(default, skip_serializing_if = "FramePrograms::is_empty")]
    pub programs: FramePrograms,
    /// Machining order of hinges and the lock, e.g. `["lock", "hinge2", "hinge1"]`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<DocumentId>,
}

impl FrameConfig {
    /// A frame with no components requested
    pub fn new(height: f64, width: f64, door_width: f64) -> Self {
        Self {
            height,
            width,
            door_width,
            orientation: Orientation::default(),
            machine_offset: MachineOffset::default(),
            lock_y_offset: None,
            hinge_y_offset: None,
            hinges: ComponentRequest::default(),
            lock: None,
            pm_positions: ComponentRequest::default(),
            programs: FramePrograms::default(),
            order: Vec::new(),
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_hinges(mut self, hinges: ComponentRequest) -> Self {
        self.hinges = hinges;
        self
    }

    pub fn with_lock(mut self, lock: LockRequest) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn with_pms(mut self, pms: ComponentRequest) -> Self {
        self.pm_positions = pms;
        self
    }

    /// Program profile for one door handing
    pub fn with_program(mut self, orientation: Orientation, profile: impl Into<String>) -> Self {
        let slot = match orientation {
            Orientation::Right => &mut self.programs.right,
            Orientation::Left => &mut self.programs.left,
        };
        *slot = Some(profile.into());
        self
    }

    pub fn with_order(mut self, order: &[DocumentId]) -> Self {
        self.order = order.to_vec();
        self
    }

    /// 1-based machining position of a component, 0 when it is not ordered
    pub fn order_of(&self, id: DocumentId) -> usize {
        self.order
            .iter()
            .position(|entry| *entry == id)
            .map_or(0, |i| i + 1)
    }
}

/// Identity of a document, e.g. `hinge2`
///
/// Serialized as its display text. Parsing also accepts the bare class name
/// for single-instance classes (`lock`, `frame`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId {
    pub class: ComponentClass,
    /// 1-based
    pub index: usize,
}

impl DocumentId {
    /// The whole-frame program document, `frame1`
    pub const FRAME: DocumentId = DocumentId {
        class: ComponentClass::Frame,
        index: 1,
    };

    pub fn new(class: ComponentClass, index: usize) -> Self {
        Self { class, index }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid document id '{0}'")]
pub struct InvalidDocumentId(pub String);

impl FromStr for DocumentId {
    type Err = InvalidDocumentId;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidDocumentId(text.to_string());
        let split = text.find(|c: char| c.is_ascii_digit()).unwrap_or(text.len());
        let (name, digits) = text.split_at(split);
        let class = ComponentClass::from_name(name).ok_or_else(invalid)?;

        let index = if digits.is_empty() && class.max_count() == 1 {
            1
        } else if digits.starts_with('0') {
            return Err(invalid());
        } else {
            digits.parse::<usize>().map_err(|_| invalid())?
        };
        if !(1..=class.max_count()).contains(&index) {
            return Err(invalid());
        }
        Ok(DocumentId::new(class, index))
    }
}

impl TryFrom<String> for DocumentId {
    type Error = InvalidDocumentId;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.to_string()
    }
}

/// Closed interval along the frame height
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

/// A component placed by the solver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentInstance {
    pub id: DocumentId,
    pub profile: Option<String>,
    /// Centre in frame coordinates (0 at the bottom of the frame)
    pub position: f64,
    /// Centre measured from the reference edge of the door's handing
    pub offset: f64,
    /// Footprint length along the frame height
    pub length: f64,
    /// Footprint widened by half the minimum clearance on each side, in reference-edge offsets
    pub clearance: Window,
    /// Position was given explicitly rather than computed
    pub pinned: bool,
}

impl ComponentInstance {
    pub fn class(&self) -> ComponentClass {
        self.id.class
    }

    pub fn index(&self) -> usize {
        self.id.index
    }

    pub fn half_length(&self) -> f64 {
        self.length / 2.0
    }
}
