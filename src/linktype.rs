use rusticata_macros::newtype_enum;

/// Data link type
///
/// The link-layer header type specifies the type of headers at the beginning
/// of the packet. Legacy files store it as a 32-bit value in the global header, pcapng files as a
/// 16-bit value in each Interface Description Block.
///
/// See <http://www.tcpdump.org/linktypes.html>
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Linktype(pub u32);

newtype_enum! {
impl display Linktype {
    NULL = 0,
    ETHERNET = 1,
    AX25 = 3,
    IEEE802_5 = 6,
    ARCNET_BSD = 7,
    SLIP = 8,
    PPP = 9,
    FDDI = 10,

    PPP_HDLC = 50,
    PPP_ETHER = 51,
    ATM_RFC1483 = 100,
    RAW = 101,
    C_HDLC = 104,
    IEEE802_11 = 105,
    FRELAY = 107,
    LOOP = 108,
    LINUX_SLL = 113,
    LTALK = 114,
    PFLOG = 117,
    IEEE802_11_PRISM = 119,
    IP_OVER_FC = 122,
    SUNATM = 123,
    IEEE802_11_RADIOTAP = 127,
    ARCNET_LINUX = 129,
    LINUX_IRDA = 144,
    IEEE802_11_AVS = 163,
    BLUETOOTH_HCI_H4 = 187,
    USB_LINUX = 189,
    PPI = 192,
    IEEE802_15_4 = 195,
    SITA = 196,
    ERF = 197,
    BLUETOOTH_HCI_H4_WITH_PHDR = 201,
    USB_LINUX_MMAPPED = 220,

    // Raw IPv4; the packet begins with an IPv4 header.
    IPV4 = 228,
    // Raw IPv6; the packet begins with an IPv6 header.
    IPV6 = 229,

    // Linux netlink NETLINK NFLOG socket log messages.
    NFLOG = 239,
    NETANALYZER = 240,
    IPOIB = 242,
    MPEG_2_TS = 243,
    NG40 = 244,
    INFINIBAND = 247,
    SCTP = 248,
    USBPCAP = 249,

    // Upper-layer protocol saves from Wireshark
    WIRESHARK_UPPER_PDU = 252,
    NETLINK = 253,
    BLUETOOTH_LINUX_MONITOR = 254,
    BLUETOOTH_LE_LL = 251,
    LINUX_SLL2 = 276,
}
}
