//! Integration tests for serde serialization of descriptors and sections

#[cfg(feature = "serde")]
#[cfg(test)]
mod tests {
    use data_encoding::BASE64;
    use dvb_si::descriptors::*;
    use dvb_si::tables::{Pat, Table};
    use dvb_si::types::ServiceType;
    use dvb_si::{Descriptor, UtcTime};

    #[test]
    fn test_descriptor_serialization() {
        let descriptor: Descriptor = ServiceDescriptor::new(ServiceType::DigitalTelevision, "Provider", "Name")
            .unwrap()
            .into();

        let json = serde_json::to_string_pretty(&descriptor).unwrap();
        println!("JSON: {json}");

        assert!(json.contains("\"Service\""));
        assert!(json.contains("\"DigitalTelevision\""));
        assert!(json.contains("\"Provider\""));
    }

    #[test]
    fn test_section_serialization() {
        let mut pat = Pat::new(1, 0).unwrap();
        pat.add_program(1, 0x0100).unwrap();
        let sections = pat.build_sections().unwrap();

        let value = serde_json::to_value(&sections[0]).unwrap();
        assert_eq!(value["table_id"], 0);
        assert_eq!(value["section_number"], 0);
        assert_eq!(value["has_crc"], true);
        assert_eq!(value["bytes"].as_array().unwrap().len(), sections[0].len());
    }

    #[test]
    fn test_section_base64_round_trip() {
        let mut pat = Pat::new(1, 0).unwrap();
        pat.add_network_pid(0x0010).unwrap();
        let sections = pat.build_sections().unwrap();

        let encoded = sections[0].to_base64();
        let decoded = BASE64.decode(encoded.as_bytes()).unwrap();
        assert_eq!(decoded, sections[0].as_bytes());
        assert!(sections[0].to_hex().starts_with("00B00D0001C10000"));
    }

    #[test]
    fn test_time_serialization() {
        let time = UtcTime::new(1993, 10, 13, 12, 45, 0).unwrap();
        let json = serde_json::to_string(&time).unwrap();
        assert!(json.contains("1993-10-13T12:45:00"));
        assert!(json.contains("49273"));
    }
}
