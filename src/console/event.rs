//! Console commands. Each command belongs to one or more panels, the same way a
//! form or link only exists on its screen; a command typed while its panel is
//! hidden is rejected before it reaches the controller.

use crate::{error::PredictError, predict::PredictionRequest, view::ViewState};
use secrecy::SecretString;

#[derive(Debug)]
pub enum Event {
    SignIn {
        email: String,
        password: SecretString,
    },
    ShowSignUp,
    ShowForgot,
    Back,
    Register {
        email: String,
        password: SecretString,
        name: String,
    },
    Verify { code: String },
    Resend,
    SendReset { email: String },
    Reset {
        code: String,
        password: SecretString,
    },
    Predict(PredictionRequest),
    Logout,
    Help,
    Quit,
}

impl Event {
    /// Whether the command is offered on `view`.
    #[must_use]
    pub fn allowed_on(&self, view: ViewState) -> bool {
        match self {
            Self::SignIn { .. } | Self::ShowSignUp | Self::ShowForgot => {
                view == ViewState::AuthSignIn
            }
            Self::Back => view.is_auth() && view != ViewState::AuthSignIn,
            Self::Register { .. } => view == ViewState::AuthSignUp,
            Self::Verify { .. } | Self::Resend => view == ViewState::AuthVerify,
            Self::SendReset { .. } => view == ViewState::AuthForgot,
            Self::Reset { .. } => view == ViewState::AuthReset,
            Self::Predict(_) | Self::Logout => view == ViewState::App,
            Self::Help | Self::Quit => true,
        }
    }
}

/// Commands offered on each panel, for prompts and `help`.
#[must_use]
pub const fn usage(view: ViewState) -> &'static str {
    match view {
        ViewState::AuthSignIn => "signin <email> <password> | signup | forgot",
        ViewState::AuthSignUp => "register <email> <password> <name> | back",
        ViewState::AuthVerify => "verify <code> | resend | back",
        ViewState::AuthForgot => "send <email> | back",
        ViewState::AuthReset => "reset <code> <new-password> | back",
        ViewState::App => "predict <N> <P> <K> <temperature> <humidity> <ph> <rainfall> | logout",
    }
}

/// Parses one input line. Blank lines yield `Ok(None)`.
///
/// # Errors
/// Returns a user-facing message for unknown commands or missing arguments.
pub fn parse(line: &str) -> Result<Option<Event>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let event = match (command.to_lowercase().as_str(), args.as_slice()) {
        ("signin" | "login", [email, password]) => Event::SignIn {
            email: (*email).to_string(),
            password: secret(password),
        },
        ("signup", []) => Event::ShowSignUp,
        ("forgot", []) => Event::ShowForgot,
        ("back", []) => Event::Back,
        ("register", [email, password, name @ ..]) if !name.is_empty() => Event::Register {
            email: (*email).to_string(),
            password: secret(password),
            name: name.join(" "),
        },
        ("verify", [code]) => Event::Verify {
            code: (*code).to_string(),
        },
        ("resend", []) => Event::Resend,
        ("send", [email]) => Event::SendReset {
            email: (*email).to_string(),
        },
        ("reset", [code, password]) => Event::Reset {
            code: (*code).to_string(),
            password: secret(password),
        },
        ("predict", values) => Event::Predict(parse_prediction(values)?),
        ("logout" | "signout", []) => Event::Logout,
        ("help" | "?", []) => Event::Help,
        ("quit" | "exit", []) => Event::Quit,
        (
            "signin" | "login" | "signup" | "forgot" | "back" | "register" | "verify" | "resend"
            | "send" | "reset" | "logout" | "signout" | "help" | "quit" | "exit",
            _,
        ) => return Err(format!("wrong arguments for '{command}', type 'help'")),
        _ => return Err(format!("unknown command '{command}', type 'help'")),
    };

    Ok(Some(event))
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn parse_prediction(values: &[&str]) -> Result<PredictionRequest, String> {
    let fields = PredictionRequest::FIELDS;
    if values.len() != fields.len() {
        return Err(format!(
            "predict takes {} values: {}",
            fields.len(),
            fields.join(" ")
        ));
    }

    let mut parsed = [0.0_f64; 7];
    for ((slot, raw), name) in parsed.iter_mut().zip(values).zip(fields) {
        *slot = raw
            .parse::<f64>()
            .map_err(|_| format!("{name} must be a number, got '{raw}'"))?;
    }

    // same wording as the notice raised by the controller
    PredictionRequest::from_values(parsed).map_err(|err| match err {
        PredictError::InvalidRequest(message) => message,
        other => other.to_string(),
    })
}
