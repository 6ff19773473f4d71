use serde::{Deserialize, Serialize};

/// Capability flags attached to every v-object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permission {
    pub allow_move_horizontal: bool,
    pub allow_move_vertical: bool,
    pub allow_rotate: bool,
    pub allow_proportional_resize: bool,
    pub allow_arbitrary_resize: bool,
    pub allow_delete: bool,
    pub allow_edit_content: bool,
    pub show_edit_button: bool,
    pub show_select_button: bool,
    pub no_print: bool,
    pub no_show: bool,
}

impl Default for Permission {
    fn default() -> Self {
        Self {
            allow_move_horizontal: true,
            allow_move_vertical: true,
            allow_rotate: true,
            allow_proportional_resize: true,
            allow_arbitrary_resize: true,
            allow_delete: true,
            allow_edit_content: true,
            show_edit_button: false,
            show_select_button: false,
            no_print: false,
            no_show: false,
        }
    }
}

impl Permission {
    /// Permission with every manipulation disabled.
    pub fn none() -> Self {
        Self {
            allow_move_horizontal: false,
            allow_move_vertical: false,
            allow_rotate: false,
            allow_proportional_resize: false,
            allow_arbitrary_resize: false,
            allow_delete: false,
            allow_edit_content: false,
            ..Self::default()
        }
    }

    pub fn allow_move(&self) -> bool {
        self.allow_move_horizontal || self.allow_move_vertical
    }

    pub fn allow_resize(&self) -> bool {
        self.allow_proportional_resize || self.allow_arbitrary_resize
    }

    /// Combined permission of two objects manipulated together.
    ///
    /// Capabilities are kept only when both grant them; the `no_*` flags
    /// apply when either sets them.
    pub fn intersect(&self, other: &Permission) -> Permission {
        Permission {
            allow_move_horizontal: self.allow_move_horizontal && other.allow_move_horizontal,
            allow_move_vertical: self.allow_move_vertical && other.allow_move_vertical,
            allow_rotate: self.allow_rotate && other.allow_rotate,
            allow_proportional_resize: self.allow_proportional_resize
                && other.allow_proportional_resize,
            allow_arbitrary_resize: self.allow_arbitrary_resize && other.allow_arbitrary_resize,
            allow_delete: self.allow_delete && other.allow_delete,
            allow_edit_content: self.allow_edit_content && other.allow_edit_content,
            show_edit_button: self.show_edit_button && other.show_edit_button,
            show_select_button: self.show_select_button && other.show_select_button,
            no_print: self.no_print || other.no_print,
            no_show: self.no_show || other.no_show,
        }
    }
}
