use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::client::ChatbotClient;
use crate::config::Settings;
use crate::controller::{ChatController, RequestOutcome};
use crate::tui::AppEvent;

pub struct App {
    pub should_quit: bool,
    pub chat: ChatController,
    pub client: ChatbotClient,
    events: mpsc::UnboundedSender<AppEvent>,

    // Chat view scroll state
    pub chat_scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16,   // inner height, set during render
    pub chat_max_scroll: u16,

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(settings: &Settings, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            chat: ChatController::new(settings.locale.strings()),
            client: ChatbotClient::new(&settings.server_url),
            events,

            chat_scroll: 0,
            follow_tail: true,
            chat_height: 0,
            chat_max_scroll: 0,

            chat_area: None,

            animation_frame: 0,
        }
    }

    /// Submit the input line and, if the controller accepts it, issue the request
    pub fn submit(&mut self) {
        if let Some(prompt) = self.chat.submit_input() {
            self.follow_tail = true;
            self.animation_frame = 0;
            self.issue_request(prompt);
        }
    }

    /// Run the request in the background; its outcome comes back as
    /// `AppEvent::Resolved`.
    fn issue_request(&self, prompt: String) {
        let client = self.client.clone();
        let tx = self.events.clone();

        tokio::spawn(async move {
            // Inner task so a panic in the request still resolves the UI
            let request = tokio::spawn(async move { client.send(&prompt).await });
            let outcome = match request.await {
                Ok(result) => RequestOutcome::from(result),
                Err(e) => {
                    tracing::error!(error = %e, "chat request task failed");
                    RequestOutcome::Failure
                }
            };
            let _ = tx.send(AppEvent::Resolved(outcome));
        });
    }

    pub fn resolve(&mut self, outcome: RequestOutcome) {
        self.chat.resolve_response(outcome);
        self.follow_tail = true;
    }

    pub fn clear(&mut self) {
        self.chat.clear_conversation();
        self.chat_scroll = 0;
        self.follow_tail = true;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if !self.chat.send_enabled() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.min(self.chat_max_scroll).saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
        if self.chat_scroll >= self.chat_max_scroll {
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.chat_height / 2).max(1));
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.chat_height / 2).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_tail = false;
        self.chat_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
        self.chat_scroll = self.chat_max_scroll;
    }

    /// Record the rendered content height; keeps the newest message in view
    /// while following the tail.
    pub fn update_scroll_bounds(&mut self, total_lines: u16, visible_height: u16) {
        self.chat_height = visible_height;
        self.chat_max_scroll = total_lines.saturating_sub(visible_height);
        if self.follow_tail || self.chat_scroll > self.chat_max_scroll {
            self.chat_scroll = self.chat_max_scroll;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::controller::Phase;
    use crate::message::Locale;
    use axum::{routing::post, Json, Router};
    use serde_json::json;
    use std::time::Duration;

    fn settings(url: &str) -> Settings {
        Settings::resolve(&Config::new(), Some(url), Some(Locale::PtBr))
    }

    async fn next_resolution(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> RequestOutcome {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("request did not resolve in time")
                .expect("event channel closed");
            if let AppEvent::Resolved(outcome) = event {
                return outcome;
            }
        }
    }

    #[tokio::test]
    async fn test_round_trip_through_backend() {
        let app_router = Router::new().route(
            "/chatbot",
            post(|| async { Json(json!({ "response": "hello" })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app_router).await.unwrap();
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(&settings(&format!("http://{}", addr)), tx);

        app.chat.input.insert_str("oi");
        app.submit();
        assert_eq!(app.chat.phase(), Phase::Sending);
        assert_eq!(app.chat.messages().len(), 2);

        let outcome = next_resolution(&mut rx).await;
        app.resolve(outcome);

        assert_eq!(app.chat.messages().last().unwrap().text, "hello");
        assert_eq!(app.chat.phase(), Phase::Idle);
        assert!(app.chat.input_focused());
    }

    #[tokio::test]
    async fn test_unreachable_backend_resolves_with_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(&settings(&format!("http://{}", addr)), tx);

        app.chat.input.insert_str("oi");
        app.submit();
        let outcome = next_resolution(&mut rx).await;
        assert_eq!(outcome, RequestOutcome::Failure);

        app.resolve(outcome);
        assert_eq!(app.chat.messages().len(), 2);
        assert!(app.chat.send_enabled());
        assert_eq!(app.chat.status_label(), "Online");
    }

    #[tokio::test]
    async fn test_blank_submit_issues_no_request() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(&settings("http://127.0.0.1:1"), tx);

        app.chat.input.insert_str("   ");
        app.submit();

        assert!(app.chat.messages().is_empty());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_scroll_follows_tail_until_user_scrolls() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(&settings("http://127.0.0.1:1"), tx);

        app.update_scroll_bounds(30, 10);
        assert_eq!(app.chat_scroll, 20);

        app.scroll_up(5);
        assert!(!app.follow_tail);
        app.update_scroll_bounds(40, 10);
        assert_eq!(app.chat_scroll, 15);

        app.scroll_down(100);
        assert!(app.follow_tail);
        assert_eq!(app.chat_scroll, 30);
    }

    #[test]
    fn test_clear_resets_scroll() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(&settings("http://127.0.0.1:1"), tx);
        app.update_scroll_bounds(30, 10);

        app.clear();

        assert_eq!(app.chat_scroll, 0);
        assert!(app.follow_tail);
        assert_eq!(app.chat.messages().len(), 1);
    }
}
