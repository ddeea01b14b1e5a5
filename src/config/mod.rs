pub mod widget;

pub use widget::{ load_widget_config, reload_widget_config_if_changed, WidgetConfig };
