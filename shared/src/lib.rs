pub mod colors;
pub mod education;
pub mod hover;
pub mod path;
pub mod scale;
pub mod scene;
pub mod topology;

pub use education::{CountyId, EducationRecord, JoinIndex};
pub use hover::{HoverState, TooltipState};
pub use scale::{LinearScale, ScaleError, ThresholdScale};
pub use scene::{MapScene, SceneError, SceneLayout};
pub use topology::{Topology, TopologyError};
