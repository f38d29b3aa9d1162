pub mod map_canvas;
pub mod menu;
pub mod record;
pub mod view;
pub mod widgets;
