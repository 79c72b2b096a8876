use glam::{UVec2, Vec2};
use trellis::*;

const WIDTH: f32 = 320.0;
const HEIGHT: f32 = 240.0;

const LAYOUT: &str = "
VerticalContainer{
    name{root}
    ColorBox{ name{header} color{2b2d42} layout{ dimX{max} dimY{32} } }
    VerticalList{
        name{list}
        clip{true}
        layout{ dimX{max} dimY{max} weight{1} }
        ColorBox{ color{8d99ae} layout{ dimX{max} dimY{48} } }
        ColorBox{ color{edf2f4} layout{ dimX{max} dimY{48} } }
        ColorBox{ color{ef233c} layout{ dimX{max} dimY{48} } }
        ColorBox{ color{d90429} layout{ dimX{max} dimY{48} } }
        ColorBox{ color{8d99ae} layout{ dimX{max} dimY{48} } }
        ColorBox{ color{edf2f4} layout{ dimX{max} dimY{48} } }
        ColorBox{ color{ef233c} layout{ dimX{max} dimY{48} } }
        ColorBox{ color{d90429} layout{ dimX{max} dimY{48} } }
    }
}
";

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut ui = Ui::new();
    let inflater = Inflater::new();

    let root = inflater.inflate_str(&mut ui, LAYOUT)?;
    ui.resize(root, Vec2::new(WIDTH, HEIGHT));

    let Some(list) = ui.find_by_name(root, "list") else {
        log::error!("no list in the layout");
        return Ok(());
    };

    let matrix = DrawList::pixel_matrix(Vec2::new(WIDTH, HEIGHT));
    let mut draw_list = DrawList::new(UVec2::new(WIDTH as u32, HEIGHT as u32));

    for factor in [0.0, 0.5, 1.0] {
        ui.set_scroll_pos_as_factor(list, factor);
        draw_list.clear();
        ui.render(root, &mut draw_list, &matrix);

        log::info!(
            "scroll {factor}: items {:?} of the list are built, {} rects drawn",
            ui.materialized_range(list),
            draw_list.rects().len(),
        );
    }

    ui.destroy(root);
    log::info!("{} widgets left after destroying the root", ui.len());
    return Ok(());
}
