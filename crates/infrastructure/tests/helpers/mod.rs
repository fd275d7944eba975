#![allow(dead_code)]

pub mod pcap_builder;
pub mod reputation_server_mock;

pub use pcap_builder::{dns_frame, dns_query, PcapFileBuilder, LINKTYPE_ETHERNET, LINKTYPE_RAW};
pub use reputation_server_mock::{MockAnswer, MockReputationServer};
