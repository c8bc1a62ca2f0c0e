//! Agent catalogue listing

use agora_core::config::AGENTS;
use console::style;

/// Prints the agents the service is known to offer.
pub fn list_agents() {
    println!("{}", style("Available agents:").bold());
    for agent in AGENTS {
        println!(
            "  {} {:<16} {}",
            agent.emoji,
            agent.name,
            style(agent.id).dim()
        );
    }
}
