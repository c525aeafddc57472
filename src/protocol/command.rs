//! Inbound line parsing.
//!
//! A line is `PROPERTY` or `PROPERTY,parameter`.  Only the first comma
//! splits; everything after it, commas included, is the parameter.

/// A parsed inbound line borrowing from the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `WIFI`: report the cached scan.
    Wifi,
    /// `SWITCH`: force the kettle into PreInit.
    Switch,
    /// `RESET`: erase credentials and restart.
    Reset,
    /// `AccessPointName,<ssid>`
    AccessPointName(&'a str),
    /// `AccessPointPassword,<passphrase>`
    AccessPointPassword(&'a str),
    /// Unknown property, or a known one in the wrong form.
    Unrecognized {
        property: &'a str,
        parameter: Option<&'a str>,
    },
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.split_once(',') {
            None => match line {
                "WIFI" => Self::Wifi,
                "SWITCH" => Self::Switch,
                "RESET" => Self::Reset,
                _ => Self::Unrecognized {
                    property: line,
                    parameter: None,
                },
            },
            Some((property, parameter)) => match property {
                "AccessPointName" => Self::AccessPointName(parameter),
                "AccessPointPassword" => Self::AccessPointPassword(parameter),
                _ => Self::Unrecognized {
                    property,
                    parameter: Some(parameter),
                },
            },
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized { .. })
    }
}
