//! Mermaid rendering helpers for pipeline graphs
//!
//! | Node        | Shape     | Mermaid Syntax |
//! |-------------|-----------|----------------|
//! | Agent       | Rectangle | `id[label]`    |
//! | START/END   | Stadium   | `id([label])`  |

/// Identifier of the synthetic start node.
pub const START_NODE: &str = "__start__";

/// Identifier of the synthetic end node.
pub const END_NODE: &str = "__end__";

/// Render a node declaration. Terminals render as stadiums.
pub fn render_node(id: &str, terminal: bool) -> String {
    match (terminal, id) {
        (true, START_NODE) => format!("    {}([START])", id),
        (true, END_NODE) => format!("    {}([END])", id),
        (true, _) => format!("    {}([{}])", id, id),
        (false, _) => format!("    {}[{}]", id, id),
    }
}

/// Render a solid edge.
pub fn render_edge(from: &str, to: &str) -> String {
    format!("    {} --> {}", from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nodes() {
        assert_eq!(render_node("critique", false), "    critique[critique]");
        assert_eq!(render_node(START_NODE, true), "    __start__([START])");
        assert_eq!(render_node(END_NODE, true), "    __end__([END])");
    }

    #[test]
    fn test_render_edge() {
        assert_eq!(render_edge("summarize", "critique"), "    summarize --> critique");
    }
}
