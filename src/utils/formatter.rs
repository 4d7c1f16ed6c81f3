use crate::runner::Exchange;
use colored::*;

/// Which response tab to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseView {
    #[default]
    Body,
    Headers,
    Raw,
    All,
}

pub struct ResponseFormatter {
    view: ResponseView,
    color: bool,
}

impl ResponseFormatter {
    pub fn new(view: ResponseView) -> Self {
        Self { view, color: true }
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn format(&self, exchange: &Exchange) -> String {
        let mut output = vec![self.status_line(exchange)];

        match self.view {
            ResponseView::Body => output.push(exchange.pretty_body.clone()),
            ResponseView::Headers => output.push(exchange.pretty_headers.clone()),
            ResponseView::Raw => output.push(exchange.raw_text.clone()),
            ResponseView::All => {
                output.push(self.section("Headers:"));
                output.push(exchange.pretty_headers.clone());
                output.push(self.section("Body:"));
                output.push(exchange.pretty_body.clone());
                output.push(self.section("Raw:"));
                output.push(exchange.raw_text.clone());
            }
        }

        output.join("\n")
    }

    /// `Status 200 OK • 12.34 ms`, green for 2xx/3xx, red otherwise.
    pub fn status_line(&self, exchange: &Exchange) -> String {
        let line = format!(
            "Status {} {} • {:.2} ms",
            exchange.status.code(),
            exchange.status.reason_phrase(),
            exchange.elapsed_ms
        );
        if !self.color {
            return line;
        }
        if exchange.status.is_ok_ish() {
            line.green().bold().to_string()
        } else {
            line.red().bold().to_string()
        }
    }

    fn section(&self, title: &str) -> String {
        if self.color {
            format!("\n{}", title.blue().bold())
        } else {
            format!("\n{}", title)
        }
    }
}
