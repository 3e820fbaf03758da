use std::fmt::Write;

use super::{Graph, Role};

pub fn role_color(role: Role) -> &'static str {
    match role {
        Role::Gateway => "#D7263D",
        Role::Local => "#1B9AAA",
        Role::Device => "#4472CA",
        Role::Vm => "#F29E4C",
        Role::Unknown => "#7C7C7C",
    }
}

impl Graph {
    /// Graphviz rendering with role-coloured nodes, gateway first.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("graph topology {\n");
        out.push_str("    layout=circo;\n");
        out.push_str("    node [style=filled, fontname=\"Helvetica\", fontsize=8, fontcolor=\"white\"];\n");
        out.push_str("    edge [color=\"#999999\"];\n");

        let gateway = self.gateway();
        let others = self.nodes().iter().filter(|node| node.id != gateway.id);

        for node in std::iter::once(gateway).chain(others) {
            let shape = if node.role == Role::Gateway {
                "doublecircle"
            } else {
                "circle"
            };
            let _ = writeln!(
                out,
                "    \"{}\" [label=\"{}\", fillcolor=\"{}\", shape={shape}, tooltip=\"{}\"];",
                node.id,
                escape(&node.label),
                role_color(node.role),
                node.role.as_str(),
            );
        }

        for edge in self.edges() {
            let _ = writeln!(out, "    \"{}\" -- \"{}\";", edge.a, edge.b);
        }

        out.push_str("}\n");
        out
    }
}

fn escape(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
