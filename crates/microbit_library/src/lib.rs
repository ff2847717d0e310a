pub mod bridge;
pub mod channels;
pub mod edges;
pub mod framer;
pub mod history;
pub mod mapping;
pub mod midi;
pub mod motor;
pub mod scheduler;
pub mod screen;
pub mod telemetry;
pub mod visualizer;
