//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Overlay Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[bridge]
# standalone = false       # resolve host calls locally (browser/dev mode)
# call_timeout_ms = 5000   # 100-60000
# resource = "overlay"

[transitions]
# dialog_exit_ms = 150     # 0-5000
# form_reset_ms = 200      # 0-5000
# context_reopen_ms = 100  # 0-5000
# fade_exit_ms = 200       # 0-5000

[dialogs]
# alert_close_on_click_outside = false
# input_close_on_click_outside = false
# date_format = "DD/MM/YYYY"

[text_ui]
# default_position = "right-center"  # right-center, left-center, top-center, bottom-center

[logging]
# level = "info"           # trace, debug, info, warn, error
"##
    .to_string()
}
