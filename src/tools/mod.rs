//! Tools the agents can call.

pub mod math;
pub mod travel;

pub use math::{
    calculator, calculator_tool, knowledge_base_tool, labelled_calculator, labelled_calculator_tool,
    search_knowledge_base,
};
pub use travel::{
    DESTINATIONS, Destination, ORIGIN, ToolInvocationArgs, TravelMode, parse_tool_input,
    travel_tools, validate_destination,
};
