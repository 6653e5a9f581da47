pub mod traits;
pub mod nav_rule;
pub mod enumeration;
pub mod stochastic;
pub mod manager;

pub use manager::AppConfig;
pub use nav_rule::NavRuleConfig;
pub use enumeration::{EnumerationConfig, EnumerationStrategy};
pub use stochastic::StochasticConfig;
pub use traits::ConfigSection;
