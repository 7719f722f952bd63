//! Assigning namespaces from X_START/X_END marker lumps.
//!
//! Mods are sloppy about markers: duplicated, missing, unpaired, or spelled with a doubled
//! letter (FF_START) by old tools.  None of that is fatal.  Whatever can be salvaged is, and the
//! rest is complained about.
use diagnostics::{MessageLevel, MessageSink};
use lump::{LumpFlags, LumpName, LumpRecord, Namespace};


/// Size of a raw 64x64 flat
pub const FLAT_SIZE: u32 = 4096;

/// Sprite lumps smaller than this can't hold a picture header.  Some old wads used them as
/// placeholders.
pub const MIN_SPRITE_SIZE: u32 = 8;

/// A pair of marker lumps delimiting a namespace.
#[derive(Copy, Clone, Debug)]
pub struct MarkerPair {
    pub start: &'static str,
    pub end: &'static str,
    pub namespace: Namespace,
    /// With no start marker at all, flag 4096-byte lumps before the last end marker as
    /// possible flats
    pub flat_fallback: bool,
}

const fn pair(start: &'static str, end: &'static str, namespace: Namespace) -> MarkerPair {
    MarkerPair { start, end, namespace, flat_fallback: false }
}

/// Markers a WAD is scanned for, in the order they're applied.
pub const WAD_MARKERS: [MarkerPair; 8] = [
    pair("S_START", "S_END", Namespace::Sprites),
    MarkerPair { start: "F_START", end: "F_END", namespace: Namespace::Flats, flat_fallback: true },
    pair("C_START", "C_END", Namespace::Colormaps),
    pair("A_START", "A_END", Namespace::AcsLibrary),
    pair("TX_START", "TX_END", Namespace::NewTextures),
    pair("V_START", "V_END", Namespace::Voices),
    pair("HI_START", "HI_END", Namespace::HiRes),
    pair("VX_START", "VX_END", Namespace::Voxels),
];


/// Whether `name` is the given marker.  Besides an exact match, a marker with `_` as its second
/// character also matches with its first letter doubled, so `FF_START` counts as `F_START`.
pub fn is_marker(name: &LumpName, marker: &str) -> bool {
    let name = name.as_bytes();
    let marker = marker.as_bytes();
    match (name.first(), marker.first()) {
        (Some(a), Some(b)) if a == b => {}
        _ => return false,
    }
    name == marker || (marker.get(1) == Some(&b'_') && &name[1..] == marker)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MarkerKind {
    Start,
    End,
}

#[derive(Copy, Clone, Debug)]
struct Marker {
    kind: MarkerKind,
    index: usize,
}

/// Put every lump between each valid pair of markers into the pair's namespace.
///
/// Lumps that already belong to another namespace are left alone, with a single warning per call
/// no matter how many overlap.  Tiny lumps between sprite markers are skipped.
pub fn assign_namespace(filename: &str, lumps: &mut [LumpRecord], pair: &MarkerPair, sink: &mut dyn MessageSink) {
    let markers: Vec<Marker> = lumps.iter().enumerate()
        .filter_map(|(index, lump)| {
            if is_marker(lump.name(), pair.start) {
                Some(Marker { kind: MarkerKind::Start, index })
            }
            else if is_marker(lump.name(), pair.end) {
                Some(Marker { kind: MarkerKind::End, index })
            }
            else {
                None
            }
        })
        .collect();

    let num_start_markers = markers.iter().filter(|m| m.kind == MarkerKind::Start).count();
    if num_start_markers == 0 {
        let last_end = match markers.last() {
            Some(marker) => marker.index,
            None => return,
        };
        sink.message(MessageLevel::Warning, format_args!(
            "{}: {} marker without corresponding {} found.", filename, pair.end, pair.start));

        if pair.flat_fallback {
            // Can't put these in the flats namespace, but the texture manager can take a hint
            for lump in lumps[..last_end].iter_mut() {
                if lump.size() == FLAT_SIZE {
                    sink.message(MessageLevel::DebugNotify, format_args!(
                        "{}: Marking {} as potential flat", filename, lump.name()));
                    lump.add_flags(LumpFlags::MAYBE_FLAT);
                }
            }
        }
        return;
    }

    let mut warned = false;
    let mut i = 0;
    while i < markers.len() {
        if markers[i].kind != MarkerKind::Start {
            sink.message(MessageLevel::Warning, format_args!(
                "{}: {} marker without corresponding {} found.", filename, pair.end, pair.start));
            i += 1;
            continue;
        }
        let start = markers[i].index;
        i += 1;

        // the block opens at the first of a run of start markers...
        while i < markers.len() && markers[i].kind == MarkerKind::Start {
            sink.message(MessageLevel::Warning, format_args!(
                "{}: duplicate {} marker found.", filename, pair.start));
            i += 1;
        }
        // ...and closes at the last of a run of end markers
        while i + 1 < markers.len() && markers[i].kind == MarkerKind::End && markers[i + 1].kind == MarkerKind::End {
            sink.message(MessageLevel::Warning, format_args!(
                "{}: duplicate {} marker found.", filename, pair.end));
            i += 1;
        }

        let end = if i >= markers.len() {
            sink.message(MessageLevel::Warning, format_args!(
                "{}: {} marker without corresponding {} found.", filename, pair.start, pair.end));
            lumps.len()
        }
        else {
            i += 1;
            markers[i - 1].index
        };

        sink.message(MessageLevel::DebugNotify, format_args!(
            "{}: Found {} block at ({}-{})", filename, pair.start, start, end));
        for (j, lump) in lumps.iter_mut().enumerate().take(end).skip(start + 1) {
            if !lump.namespace().is_global() {
                if !warned {
                    sink.message(MessageLevel::Warning, format_args!(
                        "{}: Overlapping namespaces found (lump {})", filename, j));
                }
                warned = true;
            }
            else if pair.namespace == Namespace::Sprites && lump.size() < MIN_SPRITE_SIZE {
                sink.message(MessageLevel::DebugWarn, format_args!(
                    "{}: Skipped empty sprite {} (lump {})", filename, lump.name(), j));
            }
            else {
                lump.set_namespace(pair.namespace);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use diagnostics::CollectingSink;

    fn lumps(entries: &[(&str, u32)]) -> Vec<LumpRecord> {
        entries.iter()
            .map(|&(name, size)| LumpRecord::new(LumpName::new(name), 0, size, LumpFlags::SHORT_NAME))
            .collect()
    }

    fn namespaces(lumps: &[LumpRecord]) -> Vec<Namespace> {
        lumps.iter().map(|lump| lump.namespace()).collect()
    }

    fn run(lumps: &mut [LumpRecord], pair: &MarkerPair) -> CollectingSink {
        let mut sink = CollectingSink::new();
        assign_namespace("test.wad", lumps, pair, &mut sink);
        sink
    }

    const SPRITES: MarkerPair = WAD_MARKERS[0];
    const FLATS: MarkerPair = WAD_MARKERS[1];
    const TEXTURES: MarkerPair = WAD_MARKERS[4];

    use lump::Namespace::{Flats, Global, Sprites};

    #[test]
    fn marker_spellings() {
        assert!(is_marker(&LumpName::new("S_START"), "S_START"));
        assert!(is_marker(&LumpName::new("SS_START"), "S_START"));
        assert!(is_marker(&LumpName::new("FF_END"), "F_END"));
        assert!(!is_marker(&LumpName::new("_START"), "S_START"));
        assert!(!is_marker(&LumpName::new("PS_START"), "S_START"));
        assert!(!is_marker(&LumpName::new("S_STARTX"), "S_START"));
        assert!(!is_marker(&LumpName::new(""), "S_START"));
        // no doubling for markers without an underscore in second place
        assert!(!is_marker(&LumpName::new("TTX_END"), "TX_END"));
    }

    #[test]
    fn simple_block() {
        let mut lumps = lumps(&[
            ("PLAYPAL", 768), ("COLORMAP", 8704), ("S_START", 0),
            ("TROOA1", 100), ("TROOB1", 100), ("S_END", 0), ("E1M1", 0),
        ]);
        let sink = run(&mut lumps, &SPRITES);
        assert_eq!(namespaces(&lumps), vec![Global, Global, Global, Sprites, Sprites, Global, Global]);
        assert_eq!(sink.count(MessageLevel::Warning), 0);
    }

    #[test]
    fn no_markers_is_a_no_op() {
        let mut lumps = lumps(&[("A", 1), ("B", 2)]);
        let sink = run(&mut lumps, &SPRITES);
        assert_eq!(namespaces(&lumps), vec![Global, Global]);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn tiny_sprites_are_skipped() {
        let mut lumps = lumps(&[("S_START", 0), ("EMPTA0", 5), ("TROOA1", 8), ("S_END", 0)]);
        let sink = run(&mut lumps, &SPRITES);
        assert_eq!(namespaces(&lumps), vec![Global, Global, Sprites, Global]);
        assert!(sink.contains(MessageLevel::DebugWarn, "Skipped empty sprite EMPTA0"));
    }

    #[test]
    fn tiny_lumps_fine_outside_sprites() {
        let mut lumps = lumps(&[("TX_START", 0), ("TINY", 5), ("TX_END", 0)]);
        run(&mut lumps, &TEXTURES);
        assert_eq!(lumps[1].namespace(), Namespace::NewTextures);
    }

    #[test]
    fn flat_fallback_without_start() {
        let mut lumps = lumps(&[("FLOOR1", 4096), ("WALL", 4000), ("FLOOR2", 4096), ("F_END", 0), ("AFTER", 4096)]);
        let sink = run(&mut lumps, &FLATS);
        assert_eq!(namespaces(&lumps), vec![Global; 5]);
        let maybe: Vec<bool> = lumps.iter().map(|l| l.flags().contains(LumpFlags::MAYBE_FLAT)).collect();
        assert_eq!(maybe, vec![true, false, true, false, false]);
        assert!(sink.contains(MessageLevel::Warning, "F_END marker without corresponding F_START"));
    }

    #[test]
    fn missing_start_without_fallback() {
        let mut lumps = lumps(&[("TROOA1", 4096), ("S_END", 0)]);
        let sink = run(&mut lumps, &SPRITES);
        assert!(!lumps[0].flags().contains(LumpFlags::MAYBE_FLAT));
        assert_eq!(sink.count(MessageLevel::Warning), 1);
    }

    #[test]
    fn missing_end_runs_to_end_of_wad() {
        let mut lumps = lumps(&[("X", 10), ("F_START", 0), ("FLAT1", 4096), ("FLAT2", 4096)]);
        let sink = run(&mut lumps, &FLATS);
        assert_eq!(namespaces(&lumps), vec![Global, Global, Flats, Flats]);
        assert!(sink.contains(MessageLevel::Warning, "F_START marker without corresponding F_END"));
    }

    #[test]
    fn duplicate_starts_open_at_the_first() {
        let mut lumps = lumps(&[("S_START", 0), ("A1", 10), ("SS_START", 0), ("A2", 10), ("S_END", 0)]);
        let sink = run(&mut lumps, &SPRITES);
        // the second start marker sits inside the block, but is too small to be a sprite
        assert_eq!(namespaces(&lumps), vec![Global, Sprites, Global, Sprites, Global]);
        assert!(sink.contains(MessageLevel::Warning, "duplicate S_START"));
    }

    #[test]
    fn duplicate_ends_close_at_the_last() {
        let mut lumps = lumps(&[("F_START", 0), ("A", 4096), ("F_END", 0), ("B", 4096), ("FF_END", 0), ("C", 4096)]);
        let sink = run(&mut lumps, &FLATS);
        // the first F_END is swallowed into the block like any other lump
        assert_eq!(namespaces(&lumps), vec![Global, Flats, Flats, Flats, Global, Global]);
        assert!(sink.contains(MessageLevel::Warning, "duplicate F_END"));
    }

    #[test]
    fn stray_end_after_block() {
        let mut lumps = lumps(&[("S_START", 0), ("A1", 10), ("S_END", 0), ("B1", 10), ("C_END", 0)]);
        // C_END isn't ours; nothing to warn about
        let sink = run(&mut lumps, &SPRITES);
        assert_eq!(sink.count(MessageLevel::Warning), 0);

        let mut lumps = lumps_two_blocks();
        let sink = run(&mut lumps, &SPRITES);
        assert_eq!(namespaces(&lumps), vec![Global, Sprites, Global, Global, Global, Sprites, Global]);
        assert_eq!(sink.count(MessageLevel::Warning), 0);
    }

    fn lumps_two_blocks() -> Vec<LumpRecord> {
        lumps(&[("S_START", 0), ("A1", 10), ("S_END", 0), ("MID", 10), ("S_START", 0), ("B1", 10), ("S_END", 0)])
    }

    #[test]
    fn end_then_start_warns_for_the_stray_end() {
        let mut lumps = lumps(&[("S_END", 0), ("X", 10), ("S_START", 0), ("A1", 10), ("S_END", 0)]);
        let sink = run(&mut lumps, &SPRITES);
        assert_eq!(namespaces(&lumps), vec![Global, Global, Global, Sprites, Global]);
        assert!(sink.contains(MessageLevel::Warning, "S_END marker without corresponding S_START"));
    }

    #[test]
    fn overlap_warns_once_per_call() {
        let mut lumps = lumps(&[
            ("F_START", 0), ("S_START", 0), ("A", 4096), ("B", 4096), ("S_END", 0), ("C", 4096), ("F_END", 0),
        ]);
        run(&mut lumps, &SPRITES);
        let sink = run(&mut lumps, &FLATS);
        assert_eq!(namespaces(&lumps), vec![Global, Flats, Sprites, Sprites, Flats, Flats, Global]);
        assert_eq!(sink.count(MessageLevel::Warning), 1);
        assert!(sink.contains(MessageLevel::Warning, "Overlapping namespaces found (lump 2)"));
    }
}
