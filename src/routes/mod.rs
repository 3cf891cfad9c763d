pub(crate) mod auth;
pub(crate) mod csrf;
pub(crate) mod health;
pub(crate) mod news;
pub(crate) mod stocks;
pub(crate) mod users;
pub(crate) mod watchlists;
