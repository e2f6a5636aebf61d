//! Integration tests building a complete set of SI tables for one multiplex

use dvb_si::crc;
use dvb_si::descriptors::*;
use dvb_si::tables::*;
use dvb_si::types::{RunningStatus, ServiceType, stream_type};
use dvb_si::{BcdDuration, ErrorKind, Section, SiError, UtcTime};

const TSID: u16 = 0x0401;
const ONID: u16 = 0x0085;
const NETWORK_ID: u16 = 0x3001;

fn assert_well_formed(sections: &[Section]) {
    assert!(!sections.is_empty());
    let last = sections.len() - 1;
    for (number, section) in sections.iter().enumerate() {
        assert_eq!(section.section_number() as usize, number);
        assert_eq!(section.last_section_number() as usize, last);
        assert_eq!(section.section_length() + 3, section.len());
        let crc = section.crc32().expect("long sections carry a CRC");
        assert_eq!(crc, crc::calculate_crc(section.without_crc()));
        assert_eq!(crc::calculate_crc(section.as_bytes()), 0);
    }
}

fn service_descriptor(index: u16) -> ServiceDescriptor {
    ServiceDescriptor::new(
        ServiceType::DigitalTelevision,
        "Broadcaster",
        &format!("Channel {index}"),
    )
    .unwrap()
}

#[test]
fn test_program_specific_information() {
    let mut pat = Pat::new(TSID, 1).unwrap();
    pat.add_default_network_pid().unwrap();
    let mut pmts = Vec::new();
    for program in 1..=4u16 {
        let pmt_pid = 0x0100 + program;
        pat.add_program(program, pmt_pid).unwrap();

        let video_pid = 0x0200 + program * 16;
        let mut pmt = Pmt::new(program, video_pid, 1).unwrap();
        pmt.add_program_descriptor(CaDescriptor::new(0x0B00, 0x0600 + program, vec![]).unwrap())
            .unwrap();
        pmt.add_stream(
            ElementaryStream::new(stream_type::H264_VIDEO, video_pid)
                .unwrap()
                .with_descriptor(StreamIdentifierDescriptor::new(1)),
        )
        .unwrap();
        let mut language = Iso639LanguageDescriptor::new();
        language.add_language("deu", 0x00).unwrap();
        pmt.add_stream(
            ElementaryStream::new(stream_type::ADTS_AUDIO, video_pid + 1)
                .unwrap()
                .with_descriptor(language),
        )
        .unwrap();
        pmts.push(pmt);
    }

    let sections = pat.build_sections().unwrap();
    assert_well_formed(&sections);
    assert_eq!(sections[0].len(), 8 + 5 * 4 + 4);
    assert_eq!(Pat::PID, 0x0000);

    for pmt in &mut pmts {
        let sections = pmt.build_sections().unwrap();
        assert_well_formed(&sections);
        assert_eq!(sections[0].as_bytes()[0], 0x02);
        assert_eq!(sections[0].as_bytes()[1] & 0x40, 0, "private bit cleared in PSI");
    }

    let mut cat = Cat::new(0).unwrap();
    cat.add_descriptor(CaDescriptor::new(0x0B00, 0x0700, vec![0x01]).unwrap())
        .unwrap();
    assert_well_formed(&cat.build_sections().unwrap());
}

#[test]
fn test_service_information() {
    let mut nit = Nit::new(NitKind::Actual, NETWORK_ID, 0).unwrap();
    nit.add_network_descriptor(NetworkNameDescriptor::new("Test Network").unwrap())
        .unwrap();
    let mut services = ServiceListDescriptor::new();
    for sid in 1..=4 {
        services.add_service(sid, ServiceType::DigitalTelevision).unwrap();
    }
    nit.add_transport_stream(
        TransportStreamEntry::new(TSID, ONID)
            .with_descriptor(services)
            .with_descriptor(
                SatelliteDeliverySystemDescriptor::from_raw(0x01176200, 0x0192, true, 1, 1, 0x0275000, 3)
                    .unwrap(),
            ),
    )
    .unwrap();
    let sections = nit.build_sections().unwrap();
    assert_well_formed(&sections);
    assert_eq!(sections[0].as_bytes()[1] & 0x40, 0x40, "reserved_future_use set in SI");

    let mut sdt = Sdt::new(SdtKind::Actual, TSID, ONID, 0).unwrap();
    for sid in 1..=4 {
        sdt.add_service(
            SdtService::new(sid)
                .with_eit_present_following(true)
                .with_descriptor(service_descriptor(sid)),
        )
        .unwrap();
    }
    assert_well_formed(&sdt.build_sections().unwrap());

    let mut eit = Eit::new(EitKind::PresentFollowingActual, 1, TSID, ONID, 0).unwrap();
    let start = UtcTime::new(2024, 5, 1, 20, 15, 0).unwrap();
    eit.add_event(
        EitEvent::new(1, start, BcdDuration::from_secs(45 * 60).unwrap())
            .with_running_status(RunningStatus::Running)
            .with_descriptor(ShortEventDescriptor::new("deu", "Nachrichten", "").unwrap()),
    )
    .unwrap();
    eit.add_event(EitEvent::new(
        2,
        UtcTime::new(2024, 5, 1, 21, 0, 0).unwrap(),
        BcdDuration::new(1, 30, 0).unwrap(),
    ))
    .unwrap();
    let sections = eit.build_sections().unwrap();
    assert_well_formed(&sections);
    assert_eq!(sections.len(), 2);
}

#[test]
fn test_large_sdt_splits_and_rebuilds_identically() {
    let mut sdt = Sdt::new(SdtKind::Other, TSID, ONID, 7).unwrap();
    for sid in 0..500 {
        sdt.add_service(SdtService::new(sid).with_descriptor(service_descriptor(sid)))
            .unwrap();
    }
    let first = sdt.build_sections().unwrap();
    assert!(first.len() > 10);
    assert_well_formed(&first);
    for section in &first {
        assert!(section.len() <= MAX_PSI_SECTION_LEN);
    }

    let second = sdt.build_sections().unwrap();
    assert_eq!(first, second);
    assert_eq!(sdt.state(), TableState::Serialized);

    let err = sdt.add_service(SdtService::new(1000)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn test_reserved_len_limits_every_section() {
    let mut bat = Bat::new(0x0010, 0).unwrap();
    bat.set_reserved_len(100).unwrap();
    bat.add_bouquet_descriptor(BouquetNameDescriptor::new("Bouquet").unwrap())
        .unwrap();
    for tsid in 0..80 {
        let mut services = ServiceListDescriptor::new();
        services.add_service(tsid, ServiceType::DigitalRadioSound).unwrap();
        bat.add_transport_stream(TransportStreamEntry::new(tsid, ONID).with_descriptor(services))
            .unwrap();
    }
    let sections = bat.build_sections().unwrap();
    assert_well_formed(&sections);
    assert!(sections.iter().all(|section| section.len() <= 1024 - 100));
}

#[test]
fn test_configuration_errors() {
    let mut eit = Eit::new(EitKind::ScheduleActual(0), 1, TSID, ONID, 0).unwrap();
    let err = eit.set_max_section_len(4097).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
    assert!(matches!(err, SiError::InvalidConfig { max: 4096, .. }));
    eit.set_max_section_len(4096).unwrap();

    let mut sdt = Sdt::new(SdtKind::Actual, TSID, ONID, 0).unwrap();
    assert!(sdt.set_max_section_len(4096).is_err());
    assert!(Sdt::new(SdtKind::Actual, TSID, ONID, 32).is_err());
}

#[test]
fn test_time_tables() {
    let now = UtcTime::new(2024, 3, 31, 0, 59, 59).unwrap();
    let mut tdt = Tdt::new(now);
    let sections = tdt.build_sections().unwrap();
    assert_eq!(sections[0].len(), 8);
    assert_eq!(sections[0].crc32(), None);

    let mut tot = Tot::new(now);
    let mut offsets = LocalTimeOffsetDescriptor::new();
    offsets
        .add_offset("DEU", 0, false, 60, UtcTime::new(2024, 3, 31, 1, 0, 0).unwrap(), 120)
        .unwrap();
    tot.add_descriptor(offsets).unwrap();
    let sections = tot.build_sections().unwrap();
    assert!(crc::validate_section_crc(sections[0].as_bytes()));
    assert_eq!(Tot::PID, 0x0014);
}
