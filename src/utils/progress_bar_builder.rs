use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

pub(crate) struct ProgressBarBuilder {
    style_template: &'static str,
    message: String,
    spinner: bool,
    enable_tick: bool,
    visible: bool,
    length: u64,
}

impl ProgressBarBuilder {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            style_template: "{spinner:.green} {msg}",
            message: message.into(),
            spinner: true,
            enable_tick: false,
            visible: true,
            length: 0,
        }
    }

    pub(crate) fn with_template(mut self, template: &'static str) -> Self {
        self.style_template = template;
        self
    }

    pub(crate) fn with_progress_bar(mut self, length: u64) -> Self {
        self.spinner = false;
        self.length = length;
        self
    }

    pub(crate) fn with_tick(mut self) -> Self {
        self.enable_tick = true;
        self
    }

    pub(crate) fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub(crate) fn build(self) -> ProgressBar {
        if !self.visible {
            return ProgressBar::hidden();
        }

        let pb = if self.spinner {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::new(self.length)
        };

        match ProgressStyle::default_spinner().template(self.style_template) {
            Ok(style) => pb.set_style(style),
            Err(e) => debug!("Invalid progress template {:?}: {}", self.style_template, e),
        }
        pb.set_message(self.message);

        if self.enable_tick {
            pb.enable_steady_tick(Duration::from_millis(250));
        }

        pb
    }
}
