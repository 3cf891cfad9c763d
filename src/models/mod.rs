mod asset;
mod transaction;
mod user;
mod watchlist;

pub use asset::Asset;
pub use transaction::{Side, TradeRequest, Transaction};
pub use user::{LoginRequest, NewUser, SignupRequest, User, UserResponse};
pub use watchlist::{
    AddItemRequest, CreateWatchlistRequest, Watchlist, WatchlistItem, WatchlistResponse,
};
