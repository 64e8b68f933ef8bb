//! Fixed copy shown to the visitor.

pub const GREETING: &str = "Hello, Welcome to Vizx Global AI Assistant Support!";

pub const SYSTEM_PROMPT: &str = "You are Vizx Global's AI Assistant.
- Always answer as a representative of Vizx Global.
- Vizx Global is a BPO and RPO company headquartered in Kenya with US partnerships.
- We specialize in technology, finance, real estate, healthcare, and outsourcing.
- We provide cost-effective recruitment, customer support, and digital workflow automation.
- Speak in a professional, clear, supportive tone.";

pub const AGENT_MODE: &str = "🔔 You are now connected with a real Vizx Global human agent.";
pub const ASSISTANT_MODE: &str = "🤖 You are now back with the Vizx Global AI Assistant.";

pub const AGENT_CONNECTING: &str = "⏳ Our human agents are still connecting. Your message is saved here; please send it again in a moment.";
pub const SENT_TO_AGENT: &str = "📨 Sent to human agent...";
pub const AGENT_UNREACHABLE: &str = "⚠️ We couldn't reach a human agent right now. You can switch back to the AI Assistant for help.";

pub const TECHNICAL_DIFFICULTIES: &str = "Sorry, I'm experiencing technical difficulties right now. Please try again shortly.";
pub const TROUBLE_CONNECTING: &str = "Sorry, I'm having trouble connecting right now. Please check your connection and try again.";
