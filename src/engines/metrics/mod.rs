pub mod nav;
pub mod sharpe;

pub use nav::{is_valid, nav_report, NavEntry, NavReport};
pub use sharpe::{fitness_from_parts, portfolio_capital, sharpe, volatility, VOLATILITY_EPSILON};
