//! Player skins.
//!
//! A wad with an S_SKIN lump is a skin, and skins are only supposed to replace player sprites,
//! sounds, and faces.  So the whole wad goes into a namespace of its own, where it can't clobber
//! anything else.  Skin wads that replace more than that are deliberately broken by this.
use diagnostics::{MessageLevel, MessageSink};
use lump::{LumpName, LumpRecord, Namespace};
use parse::vanilla_map_name;


/// Skin definition lumps start with this; any suffix (S_SKIN1, S_SKIN02) is dropped.
pub const SKIN_PREFIX: &str = "S_SKIN";

/// Hands out a distinct namespace for each skin wad.
///
/// Keep one of these for as long as archives that might be loaded together are being opened; two
/// archives relabeled through the same allocator never share a skin namespace.
#[derive(Debug, Default)]
pub struct SkinNamespaces {
    next: u32,
}

impl SkinNamespaces {
    pub fn new() -> Self {
        SkinNamespaces::default()
    }

    pub fn allocate(&mut self) -> Namespace {
        let namespace = Namespace::Skin(self.next);
        self.next += 1;
        namespace
    }

    /// How many skin namespaces have been handed out
    pub fn allocated(&self) -> u32 {
        self.next
    }
}

/// Rename S_SKINxx lumps to S_SKIN and, if there were any, move every lump in the archive into a
/// fresh skin namespace.  Returns that namespace.
pub fn relabel_skins(filename: &str, lumps: &mut [LumpRecord], skins: &mut SkinNamespaces, sink: &mut dyn MessageSink) -> Option<Namespace> {
    let mut skin_namespace = None;
    let mut has_map = false;

    for i in 0..lumps.len() {
        if lumps[i].name().starts_with(SKIN_PREFIX) {
            lumps[i].rename(LumpName::new(SKIN_PREFIX));
            if skin_namespace.is_none() {
                let namespace = skins.allocate();
                for lump in lumps.iter_mut() {
                    lump.set_namespace(namespace);
                }
                skin_namespace = Some(namespace);
            }
        }
        // Map names can be anything these days, so this only catches the obvious ones
        if vanilla_map_name(lumps[i].name().as_bytes()).is_ok() {
            has_map = true;
        }
    }

    if skin_namespace.is_some() && has_map {
        sink.message(MessageLevel::Attention, format_args!(
            "{}: The maps will not be loaded because it has a skin.", filename));
        sink.message(MessageLevel::Attention, format_args!(
            "You should remove the skin from the wad to play these maps."));
    }
    skin_namespace
}


#[cfg(test)]
mod tests {
    use super::*;

    use diagnostics::CollectingSink;
    use lump::LumpFlags;

    fn lumps(names: &[&str]) -> Vec<LumpRecord> {
        names.iter()
            .map(|name| LumpRecord::new(LumpName::new(name), 0, 10, LumpFlags::SHORT_NAME))
            .collect()
    }

    #[test]
    fn no_skin_leaves_everything_alone() {
        let mut skins = SkinNamespaces::new();
        let mut sink = CollectingSink::new();
        let mut lumps = lumps(&["MAP01", "THINGS", "S_SKI"]);
        assert_eq!(relabel_skins("a.wad", &mut lumps, &mut skins, &mut sink), None);
        assert!(lumps.iter().all(|lump| lump.namespace().is_global()));
        assert_eq!(skins.allocated(), 0);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn skin_moves_whole_wad() {
        let mut skins = SkinNamespaces::new();
        let mut sink = CollectingSink::new();
        let mut lumps = lumps(&["DSPLPAIN", "S_SKIN01", "PLAYA1", "S_SKIN2"]);
        let namespace = relabel_skins("marine.wad", &mut lumps, &mut skins, &mut sink);
        assert_eq!(namespace, Some(Namespace::Skin(0)));
        assert!(lumps.iter().all(|lump| lump.namespace() == Namespace::Skin(0)));
        assert!(lumps[1].name().matches("S_SKIN"));
        assert!(lumps[3].name().matches("S_SKIN"));
        assert_eq!(skins.allocated(), 1);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn each_skin_wad_gets_its_own_namespace() {
        let mut skins = SkinNamespaces::new();
        let mut sink = CollectingSink::new();
        let mut first = lumps(&["S_SKIN"]);
        let mut second = lumps(&["S_SKIN"]);
        let a = relabel_skins("a.wad", &mut first, &mut skins, &mut sink);
        let b = relabel_skins("b.wad", &mut second, &mut skins, &mut sink);
        assert!(a.is_some() && b.is_some());
        assert_ne!(a, b);
    }

    #[test]
    fn skin_with_maps_is_pointed_out() {
        let mut skins = SkinNamespaces::new();
        let mut sink = CollectingSink::new();
        let mut lumps = lumps(&["S_SKIN", "E1M1", "THINGS"]);
        relabel_skins("combo.wad", &mut lumps, &mut skins, &mut sink);
        assert_eq!(sink.count(MessageLevel::Attention), 2);
        assert!(sink.contains(MessageLevel::Attention, "combo.wad: The maps will not be loaded"));
    }
}
