/// Demonstrates building the SI tables of a small multiplex.
///
/// This example fills a PAT, an SDT and a present/following EIT, serializes
/// them and prints each section as hex. Run with `RUST_LOG=dvb_si=trace`
/// to see how tables are split into sections.
use dvb_si::descriptors::{ServiceDescriptor, ShortEventDescriptor};
use dvb_si::tables::{Eit, EitEvent, EitKind, Pat, Sdt, SdtKind, SdtService, Table};
use dvb_si::types::{RunningStatus, ServiceType};
use dvb_si::{BcdDuration, Section, SiResult, UtcTime};
use tracing_subscriber::EnvFilter;

fn print_sections(name: &str, pid: u16, sections: &[Section]) {
    println!("{name} on PID 0x{pid:04x}: {} section(s)", sections.len());
    for section in sections {
        println!(
            "   #{} ({} bytes): {}",
            section.section_number(),
            section.len(),
            section.to_hex()
        );
    }
    println!();
}

fn main() -> SiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== DVB SI Multiplex Demo ===\n");

    let transport_stream_id = 0x0001;
    let original_network_id = 0x0085;

    // 1. Program association
    let mut pat = Pat::new(transport_stream_id, 0)?;
    pat.add_default_network_pid()?;
    pat.add_program(0x0010, 0x0100)?;
    pat.add_program(0x0011, 0x0110)?;
    print_sections("PAT", Pat::PID, &pat.build_sections()?);

    // 2. Service description
    let mut sdt = Sdt::new(SdtKind::Actual, transport_stream_id, original_network_id, 0)?;
    for (service_id, name) in [(0x0010, "News 24"), (0x0011, "Movies")] {
        sdt.add_service(
            SdtService::new(service_id)
                .with_eit_present_following(true)
                .with_descriptor(ServiceDescriptor::new(
                    ServiceType::DigitalTelevision,
                    "Demo Broadcaster",
                    name,
                )?),
        )?;
    }
    print_sections("SDT", Sdt::PID, &sdt.build_sections()?);

    // 3. Now and next for the first service
    let mut eit = Eit::new(
        EitKind::PresentFollowingActual,
        0x0010,
        transport_stream_id,
        original_network_id,
        0,
    )?;
    eit.add_present_event(
        EitEvent::new(0x0001, UtcTime::new(2024, 6, 1, 18, 0, 0)?, BcdDuration::new(0, 30, 0)?)
            .with_running_status(RunningStatus::Running)
            .with_descriptor(ShortEventDescriptor::new("eng", "Evening News", "Headlines")?),
    )?;
    eit.add_following_event(
        EitEvent::new(0x0002, UtcTime::new(2024, 6, 1, 18, 30, 0)?, BcdDuration::new(1, 0, 0)?)
            .with_descriptor(ShortEventDescriptor::new("eng", "Weather", "")?),
    )?;
    print_sections("EIT p/f", Eit::PID, &eit.build_sections()?);

    // 4. A sealed table rejects further changes
    match sdt.add_service(SdtService::new(0x0012)) {
        Ok(()) => println!("unexpected: sealed SDT accepted a service"),
        Err(err) => println!("Sealed SDT: {err}"),
    }

    Ok(())
}
