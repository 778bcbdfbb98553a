//! Line-oriented terminal front-end. Reads one command per line, routes it to
//! [`App`], then redraws from the published [`ViewSnapshot`] and drains pending
//! notices. The controller never writes to the terminal itself.

pub mod event;

use crate::{
    app::App,
    identity::IdentityProvider,
    notify::Notice,
    view::{ViewSnapshot, ViewState},
};
use event::Event;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc::UnboundedReceiver, watch};
use tracing::debug;

pub struct Console<P, W> {
    app: App<P>,
    views: watch::Receiver<ViewSnapshot>,
    notices: UnboundedReceiver<Notice>,
    shown: Option<ViewState>,
    out: W,
}

impl<P: IdentityProvider, W: Write> Console<P, W> {
    pub fn new(app: App<P>, notices: UnboundedReceiver<Notice>, out: W) -> Self {
        let mut views = app.subscribe();
        views.mark_changed();
        Self {
            app,
            views,
            notices,
            shown: None,
            out,
        }
    }

    pub fn app(&self) -> &App<P> {
        &self.app
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Processes `input` until it ends or the user quits.
    ///
    /// # Errors
    /// Returns an error if reading input or writing output fails.
    pub async fn run<R>(&mut self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.render()?;

        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(self.out)?;
                break;
            };

            match event::parse(&line) {
                Ok(None) => {}
                Ok(Some(event)) => {
                    if !self.handle(event).await? {
                        break;
                    }
                }
                Err(message) => writeln!(self.out, "error: {message}")?,
            }

            self.render()?;
        }

        Ok(())
    }

    /// Returns `false` once the user asked to quit.
    async fn handle(&mut self, event: Event) -> io::Result<bool> {
        let view = self.app.current_view();
        if !event.allowed_on(view) {
            debug!("rejected {event:?} on {view:?}");
            writeln!(
                self.out,
                "error: not available on this screen, try: {}",
                event::usage(view)
            )?;
            return Ok(true);
        }

        // failures are reported through notices
        match event {
            Event::SignIn { email, password } => {
                let _ = self.app.sign_in(&email, &password).await;
            }
            Event::ShowSignUp => self.app.show(ViewState::AuthSignUp),
            Event::ShowForgot => self.app.show(ViewState::AuthForgot),
            Event::Back => self.app.show(ViewState::AuthSignIn),
            Event::Register {
                email,
                password,
                name,
            } => {
                let _ = self.app.sign_up(&email, &password, &name).await;
            }
            Event::Verify { code } => {
                let _ = self.app.verify(&code).await;
            }
            Event::Resend => {
                let _ = self.app.resend_code().await;
            }
            Event::SendReset { email } => {
                let _ = self.app.forgot_password(&email).await;
            }
            Event::Reset { code, password } => {
                let _ = self.app.reset_password(&code, &password).await;
            }
            Event::Predict(request) => {
                if let Ok(result) = self.app.predict(&request).await {
                    writeln!(self.out, "Recommended crop: {}", result.predicted_crop)?;
                }
            }
            Event::Logout => self.app.sign_out().await,
            Event::Help => {
                writeln!(self.out, "{}", event::usage(view))?;
                writeln!(self.out, "help | quit")?;
            }
            Event::Quit => return Ok(false),
        }

        Ok(true)
    }

    fn render(&mut self) -> io::Result<()> {
        if self.views.has_changed().unwrap_or(false) {
            let snapshot = self.views.borrow_and_update().clone();
            if self.shown != Some(snapshot.view) {
                self.shown = Some(snapshot.view);
                match (&snapshot.view, &snapshot.principal) {
                    (ViewState::App, Some(email)) => {
                        writeln!(self.out, "== {} == signed in as {email}", snapshot.view)?;
                    }
                    _ => writeln!(self.out, "== {} ==", snapshot.view)?,
                }
                writeln!(self.out, "{}", event::usage(snapshot.view))?;
            }
        }

        while let Ok(notice) = self.notices.try_recv() {
            writeln!(self.out, "{notice}")?;
        }

        Ok(())
    }
}
