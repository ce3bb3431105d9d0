/// Key reference overlay.

pub struct HelpPanel {
    pub visible: bool,
}

impl HelpPanel {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn total_lines(&self) -> usize {
        HELP_SECTIONS.iter().map(|(_, content)| {
            // title line + blank + content lines + blank
            2 + content.lines().count() + 1
        }).sum()
    }
}

impl Default for HelpPanel {
    fn default() -> Self {
        Self::new()
    }
}

/// Help content: (section_title, content_text)
pub static HELP_SECTIONS: &[(&str, &str)] = &[
    ("Charts", "\
The dotted line is the main package, plotted against the right axis.
Solid lines are the compared packages, sharing the left axis.
The left axis is stretched by 1 / dependencies_scale so those
lines stay below the main line."),

    ("Highlighting", "\
pointer mode   hover a line or legend entry to highlight it
touch mode     click a line or legend entry to toggle it
Everything else fades while one line is highlighted."),

    ("Keybindings", "\
  Tab / Right   next preset
  Shift-Tab     previous preset
  Left          previous preset
  r             reload (retry after an error)
  e             export charts to npmcharts.svg
  ?             toggle this help
  q / Esc       quit
  Ctrl-D        quit"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut help = HelpPanel::new();
        help.toggle();
        assert!(help.visible);
        help.toggle();
        assert!(!help.visible);
        assert!(help.total_lines() > HELP_SECTIONS.len() * 3);
    }
}
