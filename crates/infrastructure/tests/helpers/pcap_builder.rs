#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::io::Write;
use std::str::FromStr;

pub const LINKTYPE_ETHERNET: u32 = 1;
pub const LINKTYPE_RAW: u32 = 101;

/// Serialize a DNS message carrying one question per name.
pub fn dns_query(id: u16, names: &[&str], message_type: MessageType) -> Vec<u8> {
    let mut message = Message::new(id, message_type, OpCode::Query);
    message.set_recursion_desired(true);
    for name in names {
        let mut query = Query::new();
        query.set_name(Name::from_str(name).unwrap());
        query.set_query_type(RecordType::A);
        query.set_query_class(DNSClass::IN);
        message.add_query(query);
    }

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

pub fn udp(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut seg = Vec::with_capacity(8 + payload.len());
    seg.extend_from_slice(&src_port.to_be_bytes());
    seg.extend_from_slice(&dst_port.to_be_bytes());
    seg.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    seg.extend_from_slice(&[0, 0]);
    seg.extend_from_slice(payload);
    seg
}

pub fn ipv4_udp(segment: &[u8]) -> Vec<u8> {
    let mut pkt = vec![0x45, 0];
    pkt.extend_from_slice(&((20 + segment.len()) as u16).to_be_bytes());
    pkt.extend_from_slice(&[0, 1, 0, 0, 64, 17, 0, 0]);
    pkt.extend_from_slice(&[192, 168, 1, 10, 192, 168, 1, 1]);
    pkt.extend_from_slice(segment);
    pkt
}

pub fn ethernet_ipv4(packet: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; 12];
    frame.extend_from_slice(&0x0800u16.to_be_bytes());
    frame.extend_from_slice(packet);
    frame
}

/// Ethernet frame of a DNS query from a client port to port 53.
pub fn dns_frame(id: u16, names: &[&str]) -> Vec<u8> {
    ethernet_ipv4(&ipv4_udp(&udp(40000 + id, 53, &dns_query(id, names, MessageType::Query))))
}

/// Little-endian, microsecond-resolution classic pcap file.
pub struct PcapFileBuilder {
    link_type: u32,
    records: Vec<Vec<u8>>,
    trailing: Vec<u8>,
}

impl PcapFileBuilder {
    pub fn new(link_type: u32) -> Self {
        Self {
            link_type,
            records: Vec::new(),
            trailing: Vec::new(),
        }
    }

    pub fn packet(mut self, frame: Vec<u8>) -> Self {
        self.records.push(frame);
        self
    }

    /// Raw bytes appended after the last record, e.g. a cut-off record.
    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&65535u32.to_le_bytes());
        out.extend_from_slice(&self.link_type.to_le_bytes());

        for (i, frame) in self.records.iter().enumerate() {
            let len = frame.len() as u32;
            out.extend_from_slice(&(1_700_000_000 + i as u32).to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(&len.to_le_bytes());
            out.extend_from_slice(frame);
        }
        out.extend_from_slice(&self.trailing);
        out
    }

    pub fn write_temp(&self) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&self.build()).unwrap();
        file.flush().unwrap();
        file
    }
}
