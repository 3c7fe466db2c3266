//! World map: projection, display list, animation and the GTK widget.

pub mod animation;
pub mod camera;
pub mod live;
pub mod projection;
pub mod scene;
pub mod widget;
pub mod world;

pub use widget::MapWidget;
pub use world::load_world;
