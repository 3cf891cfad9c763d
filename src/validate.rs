use std::sync::OnceLock;

use bigdecimal::BigDecimal;
use regex::Regex;

use crate::models::{LoginRequest, SignupRequest, TradeRequest};

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

/// Field-keyed validation errors, accumulated in insertion order.
///
/// The frontend consumes these flattened into `"field : message"` strings
/// inside an `{"errors": [...]}` body, so ordering is part of the contract.
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    fields: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a field, keeping first-seen field order.
    pub fn add(&mut self, field: &str, message: &str) {
        if let Some((_, messages)) = self.fields.iter_mut().find(|(f, _)| f == field) {
            messages.push(message.to_string());
        } else {
            self.fields.push((field.to_string(), vec![message.to_string()]));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flatten into the `"field : message"` strings the frontend renders.
    pub fn into_messages(self) -> Vec<String> {
        self.fields
            .into_iter()
            .flat_map(|(field, messages)| {
                messages
                    .into_iter()
                    .map(move |message| format!("{} : {}", field, message))
            })
            .collect()
    }
}

const REQUIRED: &str = "This field is required.";

fn require<'a>(errors: &mut ValidationErrors, field: &str, value: &'a Option<String>) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

/// Validated login credentials, ready for the credential store.
#[derive(Debug)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

pub fn validate_login(req: &LoginRequest) -> Result<LoginCredentials, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let email = require(&mut errors, "email", &req.email);
    let password = match req.password.as_deref() {
        Some(p) if !p.is_empty() => Some(p),
        _ => {
            errors.add("password", REQUIRED);
            None
        }
    };
    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        }),
        _ => Err(errors),
    }
}

/// Validated signup fields; the password is still plaintext here and is
/// hashed by the auth service before it touches the store.
#[derive(Debug)]
pub struct SignupFields {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub buying_power: BigDecimal,
}

pub fn validate_signup(req: &SignupRequest) -> Result<SignupFields, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let first_name = require(&mut errors, "first_name", &req.first_name);
    let last_name = require(&mut errors, "last_name", &req.last_name);
    let username = require(&mut errors, "username", &req.username);

    let email = require(&mut errors, "email", &req.email);
    if let Some(email) = email {
        if !email_re().is_match(email) {
            errors.add("email", "Please provide a valid email address.");
        }
    }

    let password = match req.password.as_deref() {
        Some(p) if !p.is_empty() => {
            if p.len() < 6 {
                errors.add("password", "Password must be at least 6 characters.");
            }
            Some(p)
        }
        _ => {
            errors.add("password", REQUIRED);
            None
        }
    };

    let buying_power = match &req.buying_power {
        Some(bp) => {
            if bp < &BigDecimal::from(0) {
                errors.add("buying_power", "Buying power cannot be negative.");
            }
            Some(bp.clone())
        }
        None => {
            errors.add("buying_power", REQUIRED);
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    // All the Options are Some here; the matches above guarantee it.
    Ok(SignupFields {
        first_name: first_name.unwrap_or_default().to_string(),
        last_name: last_name.unwrap_or_default().to_string(),
        username: username.unwrap_or_default().to_string(),
        email: email.unwrap_or_default().to_lowercase(),
        password: password.unwrap_or_default().to_string(),
        buying_power: buying_power.unwrap_or_default(),
    })
}

/// Validated trade order (buy or sell share quantities at a quoted price).
#[derive(Debug)]
pub struct TradeOrder {
    pub symbol: String,
    pub quantity: i64,
    pub price: BigDecimal,
}

pub fn validate_trade(req: &TradeRequest) -> Result<TradeOrder, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let symbol = require(&mut errors, "symbol", &req.symbol).map(str::to_uppercase);

    let quantity = match req.quantity {
        Some(q) if q > 0 => Some(q),
        Some(_) => {
            errors.add("quantity", "Quantity must be a positive whole number.");
            None
        }
        None => {
            errors.add("quantity", REQUIRED);
            None
        }
    };

    let price = match &req.price {
        Some(p) if p > &BigDecimal::from(0) => Some(p.clone()),
        Some(_) => {
            errors.add("price", "Price must be greater than zero.");
            None
        }
        None => {
            errors.add("price", REQUIRED);
            None
        }
    };

    match (symbol, quantity, price) {
        (Some(symbol), Some(quantity), Some(price)) if errors.is_empty() => Ok(TradeOrder {
            symbol,
            quantity,
            price,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn signup_request() -> SignupRequest {
        SignupRequest {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            username: Some("ada".into()),
            email: Some("ada@example.com".into()),
            password: Some("hunter22".into()),
            buying_power: Some(BigDecimal::from(10_000)),
            csrf_token: None,
        }
    }

    #[test]
    fn messages_use_field_colon_message_format() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "This field is required.");
        errors.add("email", "Please provide a valid email address.");
        errors.add("password", "This field is required.");

        let messages = errors.into_messages();
        assert_eq!(
            messages,
            vec![
                "email : This field is required.",
                "email : Please provide a valid email address.",
                "password : This field is required.",
            ]
        );
    }

    #[test]
    fn login_requires_both_fields() {
        let req = LoginRequest {
            email: None,
            password: Some("".into()),
            csrf_token: None,
        };
        let errors = validate_login(&req).unwrap_err().into_messages();
        assert_eq!(
            errors,
            vec![
                "email : This field is required.",
                "password : This field is required.",
            ]
        );
    }

    #[test]
    fn login_accepts_complete_credentials() {
        let req = LoginRequest {
            email: Some("  ada@example.com ".into()),
            password: Some("hunter22".into()),
            csrf_token: None,
        };
        let creds = validate_login(&req).unwrap();
        assert_eq!(creds.email, "ada@example.com");
        assert_eq!(creds.password, "hunter22");
    }

    #[test]
    fn signup_rejects_malformed_email() {
        let mut req = signup_request();
        req.email = Some("not-an-email".into());
        let errors = validate_signup(&req).unwrap_err().into_messages();
        assert_eq!(errors, vec!["email : Please provide a valid email address."]);
    }

    #[test]
    fn signup_rejects_negative_buying_power() {
        let mut req = signup_request();
        req.buying_power = Some(BigDecimal::from_str("-0.01").unwrap());
        let errors = validate_signup(&req).unwrap_err().into_messages();
        assert_eq!(errors, vec!["buying_power : Buying power cannot be negative."]);
    }

    #[test]
    fn signup_collects_every_missing_field() {
        let req = SignupRequest {
            first_name: None,
            last_name: None,
            username: None,
            email: None,
            password: None,
            buying_power: None,
            csrf_token: None,
        };
        let errors = validate_signup(&req).unwrap_err().into_messages();
        assert_eq!(
            errors,
            vec![
                "first_name : This field is required.",
                "last_name : This field is required.",
                "username : This field is required.",
                "email : This field is required.",
                "password : This field is required.",
                "buying_power : This field is required.",
            ]
        );
    }

    #[test]
    fn signup_lowercases_email() {
        let mut req = signup_request();
        req.email = Some("Ada@Example.COM".into());
        let fields = validate_signup(&req).unwrap();
        assert_eq!(fields.email, "ada@example.com");
    }

    #[test]
    fn trade_rejects_non_positive_amounts() {
        let req = TradeRequest {
            symbol: Some("aapl".into()),
            quantity: Some(0),
            price: Some(BigDecimal::from(0)),
            csrf_token: None,
        };
        let errors = validate_trade(&req).unwrap_err().into_messages();
        assert_eq!(
            errors,
            vec![
                "quantity : Quantity must be a positive whole number.",
                "price : Price must be greater than zero.",
            ]
        );
    }

    #[test]
    fn trade_uppercases_symbol() {
        let req = TradeRequest {
            symbol: Some("tsla".into()),
            quantity: Some(3),
            price: Some(BigDecimal::from(200)),
            csrf_token: None,
        };
        let order = validate_trade(&req).unwrap();
        assert_eq!(order.symbol, "TSLA");
        assert_eq!(order.quantity, 3);
    }
}
