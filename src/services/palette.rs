/// A named marker color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub name: &'static str,
    pub rgb: [u8; 3],
}

const fn color(name: &'static str, r: u8, g: u8, b: u8) -> PaletteColor {
    PaletteColor { name, rgb: [r, g, b] }
}

pub const PALETTE: [PaletteColor; 25] = [
    color("red", 255, 0, 0),
    color("blue", 0, 0, 255),
    color("moccasin", 255, 228, 181),
    color("yellow", 255, 255, 0),
    color("green", 0, 255, 0),
    color("black", 0, 0, 0),
    color("brown", 165, 42, 42),
    color("grey", 190, 190, 190),
    color("gold", 255, 215, 0),
    color("pink", 255, 192, 203),
    color("SandyBrown", 244, 164, 96),
    color("violet", 238, 130, 238),
    color("tomato", 255, 99, 71),
    color("greenyellow", 173, 255, 47),
    color("lavender", 230, 230, 250),
    color("orange", 255, 165, 0),
    color("salmon", 250, 128, 114),
    color("tan", 210, 180, 140),
    color("turquoise", 64, 224, 208),
    color("seagreen", 46, 139, 87),
    color("sienna", 160, 82, 45),
    color("RosyBrown", 188, 143, 143),
    color("plum", 221, 160, 221),
    color("orchid", 218, 112, 214),
    color("navy", 0, 0, 128),
];

/// Color of the team at `index` in the currently displayed team list.
pub fn color_for(index: usize) -> PaletteColor {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_follow_list_position_and_wrap() {
        let teams = ["a", "b", "c"];
        for (index, _) in teams.iter().enumerate() {
            assert_eq!(color_for(index), PALETTE[index]);
        }
        assert_eq!(color_for(25), PALETTE[0]);
        assert_eq!(color_for(26).name, "blue");
    }

    #[test]
    fn palette_names_are_unique() {
        for (i, a) in PALETTE.iter().enumerate() {
            for b in &PALETTE[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
