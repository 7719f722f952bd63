pub mod util;
pub mod wad;

use std::fmt;

use nom::{is_digit, le_u8};

use self::util::naive_eof;


/// A map slot name in one of the two vanilla spellings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MapName {
    ExMy(u8, u8),
    MAPxx(u8),
}

impl fmt::Display for MapName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MapName::ExMy(e, m) => write!(f, "E{}M{}", e, m),
            MapName::MAPxx(xx) => write!(f, "MAP{:02}", xx),
        }
    }
}


// Map name parsing -- doesn't clearly belong anywhere in particular

named!(exmy_map_name<MapName>, do_parse!(
    tag!(b"E") >>
    e: verify!(le_u8, is_digit) >>
    tag!(b"M") >>
    m: verify!(le_u8, is_digit) >>
    naive_eof >>
    (MapName::ExMy(e - b'0', m - b'0'))
));

// Any two digits, including MAP00; skins only care that something looks like a map
named!(mapxx_map_name<MapName>, do_parse!(
    tag!(b"MAP") >>
    x: verify!(le_u8, is_digit) >>
    y: verify!(le_u8, is_digit) >>
    naive_eof >>
    (MapName::MAPxx((x - b'0') * 10 + (y - b'0')))
));

named!(pub vanilla_map_name<MapName>, alt!(exmy_map_name | mapxx_map_name));


#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &[u8]) -> Option<MapName> {
        vanilla_map_name(name).ok().map(|(_, map_name)| map_name)
    }

    #[test]
    fn map_names() {
        assert_eq!(parse(b"E1M1"), Some(MapName::ExMy(1, 1)));
        assert_eq!(parse(b"E4M9"), Some(MapName::ExMy(4, 9)));
        assert_eq!(parse(b"MAP01"), Some(MapName::MAPxx(1)));
        assert_eq!(parse(b"MAP32"), Some(MapName::MAPxx(32)));
        assert_eq!(parse(b"MAP99"), Some(MapName::MAPxx(99)));
        assert_eq!(format!("{}", MapName::MAPxx(7)), "MAP07");
    }

    #[test]
    fn not_map_names() {
        assert_eq!(parse(b"E1M10"), None);
        assert_eq!(parse(b"MAP1"), None);
        assert_eq!(parse(b"MAP01A"), None);
        assert_eq!(parse(b"EXMY"), None);
        assert_eq!(parse(b"S_SKIN"), None);
        assert_eq!(parse(b""), None);
    }
}
