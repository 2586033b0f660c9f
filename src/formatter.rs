use crate::connection_info::ConnectionInfoView;

// ANSI color codes
pub struct Colors;

impl Colors {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";

    // Colors
    pub const RED: &'static str = "\x1b[31m";
    pub const GRAY: &'static str = "\x1b[90m";

    // Bright colors
    pub const BRIGHT_RED: &'static str = "\x1b[91m";
    pub const BRIGHT_GREEN: &'static str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &'static str = "\x1b[93m";
    pub const BRIGHT_BLUE: &'static str = "\x1b[94m";
    pub const BRIGHT_MAGENTA: &'static str = "\x1b[95m";
    pub const BRIGHT_CYAN: &'static str = "\x1b[96m";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Minimal,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "minimal" => OutputFormat::Minimal,
            _ => OutputFormat::Table,
        }
    }
}

/// Renders the connection-info panel as text.
pub struct ViewFormatter {
    format: OutputFormat,
    colored: bool,
}

impl ViewFormatter {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self {
            format,
            colored,
        }
    }

    /// `None` while the panel's container is hidden.
    pub fn render(&self, view: &ConnectionInfoView) -> Option<String> {
        if !view.container.get().is_visible() {
            return None;
        }

        let rows = [
            ("Peers", view.peers_connected.get()),
            ("Balance", view.total_balance.get()),
            ("Block", view.latest_block.get()),
            ("Network", view.network_type.get()),
        ];

        Some(match self.format {
            OutputFormat::Table => self.render_table(&rows),
            OutputFormat::Json => Self::render_json(&rows),
            OutputFormat::Minimal => Self::render_minimal(&rows),
        })
    }

    pub fn print(&self, view: &ConnectionInfoView) {
        if let Some(text) = self.render(view) {
            println!("{}", text);
        }
    }

    fn render_table(&self, rows: &[(&str, String)]) -> String {
        let (gray, bold, value_color, reset) = if self.colored {
            (Colors::GRAY, Colors::BOLD, Colors::BRIGHT_CYAN, Colors::RESET)
        } else {
            ("", "", "", "")
        };

        let width = rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or(0)
            .max(12);
        let rule = "─".repeat(width + 2);

        let mut out = format!("{}┌─────────┬{}┐{}\n", gray, rule, reset);
        for (label, value) in rows {
            out.push_str(&format!(
                "{}│{} {}{:<7}{} {}│{} {}{:<width$}{} {}│{}\n",
                gray,
                reset,
                bold,
                label,
                reset,
                gray,
                reset,
                value_color,
                value,
                reset,
                gray,
                reset,
                width = width
            ));
        }
        out.push_str(&format!("{}└─────────┴{}┘{}", gray, rule, reset));
        out
    }

    fn render_json(rows: &[(&str, String)]) -> String {
        let json_obj = serde_json::json!({
            "peersConnected": rows[0].1,
            "totalBalance": rows[1].1,
            "latestBlock": rows[2].1,
            "networkType": rows[3].1,
        });
        json_obj.to_string()
    }

    fn render_minimal(rows: &[(&str, String)]) -> String {
        rows.iter()
            .map(|(label, value)| format!("{}={}", label.to_lowercase(), value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::Visibility;

    fn filled_view() -> ConnectionInfoView {
        let view = ConnectionInfoView::default();
        view.peers_connected.set("5".to_string());
        view.total_balance.set("10.5".to_string());
        view.latest_block.set("123".to_string());
        view.network_type.set("mainnet".to_string());
        view.container.set(Visibility::Visible);
        view
    }

    #[test]
    fn test_hidden_view_renders_nothing() {
        let formatter = ViewFormatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.render(&ConnectionInfoView::default()), None);
    }

    #[test]
    fn test_minimal_format() {
        let formatter = ViewFormatter::new(OutputFormat::Minimal, false);
        assert_eq!(
            formatter.render(&filled_view()).unwrap(),
            "peers=5 balance=10.5 block=123 network=mainnet"
        );
    }

    #[test]
    fn test_json_format() {
        let formatter = ViewFormatter::new(OutputFormat::Json, true);
        let rendered: serde_json::Value =
            serde_json::from_str(&formatter.render(&filled_view()).unwrap()).unwrap();
        assert_eq!(rendered["networkType"], "mainnet");
        assert_eq!(rendered["peersConnected"], "5");
    }

    #[test]
    fn test_plain_table_has_no_escape_codes() {
        let formatter = ViewFormatter::new(OutputFormat::Table, false);
        let table = formatter.render(&filled_view()).unwrap();

        assert!(!table.contains('\x1b'));
        assert!(table.contains("│ Network │ mainnet"));
        assert_eq!(table.lines().count(), 6);
    }

    #[test]
    fn test_format_parsing_falls_back_to_table() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("csv"), OutputFormat::Table);
    }
}
