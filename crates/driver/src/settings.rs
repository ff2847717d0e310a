use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub(crate) struct Settings {
    /// Serial device of the micro:bit. Empty picks the first port found.
    pub serial_port: String,
    pub baud_rate: u32,
    pub client_name: String,
    /// Output ports whose name contains one of these are preferred, in order.
    /// Without a match the first available port is used.
    pub port_match: Vec<String>,
    /// If true, create a virtual output port (unix only) instead of connecting
    /// to an existing one. Synths then connect to `port_name`.
    pub virtual_port: bool,
    pub port_name: String,
    /// Status screen redraws per second.
    pub refresh_hz: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serial_port: "".to_string(),
            baud_rate: 115_200,
            client_name: "micro:bit MIDI bridge".to_string(),
            port_match: vec!["Microbit".to_string(), "Bus".to_string()],
            virtual_port: false,
            port_name: "micro:bit MIDI Out".to_string(),
            refresh_hz: 30,
        }
    }
}

impl Settings {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.baud_rate == 0 {
            return Err("baud_rate must be positive".to_string());
        }

        if self.client_name.is_empty() {
            return Err("Client name must not be empty".to_string());
        }

        if self.virtual_port && self.port_name.is_empty() {
            return Err("Port name must not be empty when virtual_port = true".to_string());
        }

        if self.port_match.iter().any(|p| p.trim().is_empty()) {
            return Err("port_match entries must not be empty".to_string());
        }

        if !(1..=120).contains(&self.refresh_hz) {
            let hz = self.refresh_hz;
            return Err(format!("refresh_hz must be 1 to 120 (found {hz})"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Ok(()), Settings::default().validate());
    }

    #[test]
    fn rejects_bad_refresh_rate() {
        let settings = Settings {
            refresh_hz: 0,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn virtual_port_needs_a_name() {
        let settings = Settings {
            virtual_port: true,
            port_name: "".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                "serial_port = \"/dev/ttyACM0\"",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let settings: Settings = cfg.try_deserialize().unwrap();
        assert_eq!("/dev/ttyACM0", settings.serial_port);
        assert_eq!(115_200, settings.baud_rate);
        assert_eq!(vec!["Microbit", "Bus"], settings.port_match);
    }
}
