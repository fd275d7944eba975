//! Link, network and transport layer decoding down to a DNS payload.
//!
//! Only what is needed to reach UDP port 53 is parsed; anything else
//! (TCP, fragments, unknown ethertypes) yields `None`.

pub const LINKTYPE_NULL: u32 = 0;
pub const LINKTYPE_ETHERNET: u32 = 1;
pub const LINKTYPE_RAW_LEGACY: u32 = 12;
pub const LINKTYPE_RAW: u32 = 101;
pub const LINKTYPE_LINUX_SLL: u32 = 113;
pub const LINKTYPE_IPV4: u32 = 228;
pub const LINKTYPE_IPV6: u32 = 229;

const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERTYPE_IPV6: u16 = 0x86dd;
const ETHERTYPE_VLAN: u16 = 0x8100;
const ETHERTYPE_QINQ: u16 = 0x88a8;

const IPPROTO_UDP: u8 = 17;
const DNS_PORT: u16 = 53;

const ETHERNET_HEADER_LEN: usize = 14;
const SLL_HEADER_LEN: usize = 16;
const NULL_HEADER_LEN: usize = 4;
const UDP_HEADER_LEN: usize = 8;
const IPV6_HEADER_LEN: usize = 40;

pub fn is_supported_link_type(link_type: u32) -> bool {
    matches!(
        link_type,
        LINKTYPE_NULL
            | LINKTYPE_ETHERNET
            | LINKTYPE_RAW_LEGACY
            | LINKTYPE_RAW
            | LINKTYPE_LINUX_SLL
            | LINKTYPE_IPV4
            | LINKTYPE_IPV6
    )
}

/// Returns the UDP payload of a DNS datagram (either port 53), if any.
pub fn dns_payload(link_type: u32, frame: &[u8]) -> Option<&[u8]> {
    let ip = match link_type {
        LINKTYPE_ETHERNET => ethernet_payload(frame)?,
        LINKTYPE_LINUX_SLL => {
            let ethertype = read_u16(frame, 14)?;
            let payload = frame.get(SLL_HEADER_LEN..)?;
            return by_ethertype(ethertype, payload);
        }
        LINKTYPE_NULL => frame.get(NULL_HEADER_LEN..)?,
        LINKTYPE_RAW | LINKTYPE_RAW_LEGACY | LINKTYPE_IPV4 | LINKTYPE_IPV6 => frame,
        _ => return None,
    };
    ip_payload(ip)
}

fn ethernet_payload(frame: &[u8]) -> Option<&[u8]> {
    let mut ethertype = read_u16(frame, 12)?;
    let mut offset = ETHERNET_HEADER_LEN;
    // 802.1Q / 802.1ad tags, possibly stacked
    while ethertype == ETHERTYPE_VLAN || ethertype == ETHERTYPE_QINQ {
        ethertype = read_u16(frame, offset + 2)?;
        offset += 4;
    }
    match ethertype {
        ETHERTYPE_IPV4 | ETHERTYPE_IPV6 => frame.get(offset..),
        _ => None,
    }
}

fn by_ethertype(ethertype: u16, payload: &[u8]) -> Option<&[u8]> {
    match ethertype {
        ETHERTYPE_IPV4 | ETHERTYPE_IPV6 => ip_payload(payload),
        _ => None,
    }
}

/// Dispatch on the IP version nibble.
fn ip_payload(packet: &[u8]) -> Option<&[u8]> {
    match packet.first()? >> 4 {
        4 => ipv4_udp(packet),
        6 => ipv6_udp(packet),
        _ => None,
    }
}

fn ipv4_udp(packet: &[u8]) -> Option<&[u8]> {
    let ihl = usize::from(packet.first()? & 0x0f) * 4;
    if ihl < 20 || packet.len() < ihl {
        return None;
    }
    let flags_fragment = read_u16(packet, 6)?;
    let more_fragments = flags_fragment & 0x2000 != 0;
    let fragment_offset = flags_fragment & 0x1fff;
    if more_fragments || fragment_offset != 0 {
        return None;
    }
    if packet[9] != IPPROTO_UDP {
        return None;
    }
    let total_len = usize::from(read_u16(packet, 2)?);
    let end = if total_len >= ihl && total_len <= packet.len() {
        total_len
    } else {
        packet.len()
    };
    udp_dns(packet.get(ihl..end)?)
}

fn ipv6_udp(packet: &[u8]) -> Option<&[u8]> {
    if packet.len() < IPV6_HEADER_LEN {
        return None;
    }
    let mut next_header = packet[6];
    let mut offset = IPV6_HEADER_LEN;
    loop {
        match next_header {
            IPPROTO_UDP => break,
            // hop-by-hop, routing, destination options
            0 | 43 | 60 => {
                next_header = *packet.get(offset)?;
                let ext_len = (usize::from(*packet.get(offset + 1)?) + 1) * 8;
                offset += ext_len;
            }
            // fragment header, payload needs reassembly
            44 => return None,
            _ => return None,
        }
    }
    udp_dns(packet.get(offset..)?)
}

fn udp_dns(segment: &[u8]) -> Option<&[u8]> {
    let src_port = read_u16(segment, 0)?;
    let dst_port = read_u16(segment, 2)?;
    if src_port != DNS_PORT && dst_port != DNS_PORT {
        return None;
    }
    let udp_len = usize::from(read_u16(segment, 4)?);
    let end = if udp_len >= UDP_HEADER_LEN && udp_len <= segment.len() {
        udp_len
    } else {
        segment.len()
    };
    segment.get(UDP_HEADER_LEN..end)
}

#[inline]
fn read_u16(buf: &[u8], offset: usize) -> Option<u16> {
    let bytes = buf.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}
