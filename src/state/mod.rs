mod studio;

pub use studio::{PanelHandle, Studio};
