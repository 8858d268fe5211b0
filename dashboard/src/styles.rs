mod global {
    turf::style_sheet!("assets/global.css");
}

mod layout {
    turf::style_sheet!("assets/layout.css");
}

mod plots {
    turf::style_sheet!("assets/plots.css");
}

pub use layout::ClassName as Layout;
pub use plots::ClassName as Plots;

use std::sync::LazyLock;

pub static ALL: LazyLock<String> = LazyLock::new(|| {
    [
        global::STYLE_SHEET,
        layout::STYLE_SHEET,
        plots::STYLE_SHEET,
    ]
    .join("\n")
});
