pub mod accessor;
pub mod bar_series;
pub mod barh_series;
pub mod extent;
pub mod frame;
pub mod frame_group;
pub mod line_series;
pub mod palette;
pub mod rect_series;
pub mod scale;
pub mod series;
pub mod ticks;
pub mod types;
pub mod value;

pub use accessor::{Accessor, AccessorFn, ValueAccessor};
pub use bar_series::{BarOptions, BarSeries};
pub use barh_series::{BarhOptions, BarhSeries};
pub use extent::Extent;
pub use frame::Frame;
pub use frame_group::{FrameGroup, NestedFrameGroup};
pub use line_series::{LineOptions, LineSeries, LineStyle};
pub use palette::{DEFAULT_PALETTE, Palette};
pub use rect_series::{RectOptions, RectSeries};
pub use scale::{BandScale, LinearScale, XScale};
pub use series::{
    DrawContext, GridLineShape, LineShape, RectShape, SelectCallback, Series, SeriesKind,
    SeriesList, SeriesMeta, SeriesShape, TextShape, push_series,
};
pub use types::{Margins, PlotArea, Viewport};
pub use value::{GroupKey, Record, Row, Value};
