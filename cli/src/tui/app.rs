//! TUI application state.
//!
//! `App` owns the single mutable inventory; every refresh replaces it
//! wholesale with a new resolution. The core stays stateless.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use portman_core::{PortBinding, PortResolver, ProcessTerminator, TerminationOutcome};

/// How long an error notice stays up before it expires on its own.
const NOTICE_VISIBLE_FOR: Duration = Duration::from_secs(5);

/// A pending kill awaiting operator confirmation.
pub struct ConfirmKill {
    pub port: u16,
    pub pid: u32,
    pub process_name: String,
}

struct Notice {
    text: String,
    shown_at: Instant,
}

pub struct App {
    resolver: PortResolver,
    terminator: ProcessTerminator,
    pub inventory: Vec<PortBinding>,
    pub selected: usize,
    status: String,
    confirm: Option<ConfirmKill>,
    notice: Option<Notice>,
    quit: bool,
}

impl App {
    pub async fn new() -> Self {
        let mut app = Self {
            resolver: PortResolver::probe().await,
            terminator: ProcessTerminator::new(),
            inventory: Vec::new(),
            selected: 0,
            status: String::new(),
            confirm: None,
            notice: None,
            quit: false,
        };
        app.refresh().await;
        app
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn confirm(&self) -> Option<&ConfirmKill> {
        self.confirm.as_ref()
    }

    pub fn notice_text(&self) -> Option<&str> {
        self.notice.as_ref().map(|notice| notice.text.as_str())
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Expire the error notice once it has been up long enough to read.
    pub fn tick(&mut self) {
        if let Some(notice) = &self.notice {
            if notice.shown_at.elapsed() >= NOTICE_VISIBLE_FOR {
                self.notice = None;
            }
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        if self.confirm.is_some() {
            self.handle_confirm_key(key).await;
            return;
        }

        if self.notice.is_some() && key.code == KeyCode::Esc {
            self.notice = None;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Char('x') => self.request_kill(),
            _ => {}
        }
    }

    async fn refresh(&mut self) {
        self.inventory = self.resolver.resolve().await;
        self.selected = self.selected.min(self.inventory.len().saturating_sub(1));
        self.status = if self.inventory.is_empty() {
            "No processes listening on ports found (may require sudo)".to_string()
        } else {
            format!(
                "Found {} process(es) listening on ports",
                self.inventory.len()
            )
        };
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.inventory.len() {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn request_kill(&mut self) {
        let Some(binding) = self.inventory.get(self.selected) else {
            self.status = "No processes to kill".to_string();
            return;
        };
        self.confirm = Some(ConfirmKill {
            port: binding.port,
            pid: binding.pid,
            process_name: binding.process_name.clone(),
        });
    }

    async fn handle_confirm_key(&mut self, key: KeyEvent) {
        let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Enter);
        let declined = matches!(key.code, KeyCode::Char('n') | KeyCode::Esc);
        if !confirmed && !declined {
            return;
        }

        let Some(target) = self.confirm.take() else {
            return;
        };

        let Some(outcome) = self
            .terminator
            .terminate(target.pid, &target.process_name, confirmed)
        else {
            // Declined: the target keeps running, nothing changes.
            return;
        };

        if outcome.triggers_refresh() {
            self.refresh().await;
        }

        match outcome {
            TerminationOutcome::Succeeded => {
                self.status = format!(
                    "Terminated '{}' (PID: {})",
                    target.process_name, target.pid
                );
            }
            TerminationOutcome::AlreadyGone => {
                self.status = format!("Process {} no longer exists", target.pid);
            }
            TerminationOutcome::Denied => {
                self.show_notice(format!(
                    "Permission denied: cannot kill '{}' (PID: {})",
                    target.process_name, target.pid
                ));
            }
            TerminationOutcome::Unexpected(detail) => {
                self.show_notice(format!("Error killing process: {}", detail));
            }
        }
    }

    fn show_notice(&mut self, text: String) {
        self.notice = Some(Notice {
            text,
            shown_at: Instant::now(),
        });
    }
}
