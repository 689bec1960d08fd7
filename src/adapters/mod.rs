pub mod discord_gateway;
pub mod discord_rest;

pub use discord_gateway::DiscordGateway;
pub use discord_rest::DiscordRestClient;
