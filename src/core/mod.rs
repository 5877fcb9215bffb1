pub mod band_scale;
pub mod join;
pub mod primitives;
pub mod scale;
pub mod ticks;
pub mod time_scale;
pub mod types;

pub use band_scale::{Band, BandScale, BandSpec};
pub use join::{BoundRecord, DatasetJoiner, EnterEntry, ExitEntry, JoinResult, UpdateEntry};
pub use scale::{ContinuousKind, ContinuousScale, DomainPolicy, ScaleFactory, ScaleSpec, extent};
pub use time_scale::{TimeScale, TimeScaleSpec, format_time};
pub use types::{Key, KeyStrategy, Record, RecordShape, Viewport, ensure_shape};
