use std::num::NonZeroU32;

use eyre::{eyre, WrapErr};
use palette::{LinSrgb, Mix, Srgb};

use inkbuf::{
    config::ViewerConfig,
    graphics::{self, typeface::Typeface, Color},
    layout::Position,
    render::{text::TextRun, ColorBuf, DrawBuf, Drawable, GrayBuf, ImageSource, RgbaImage},
};

use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

/// A soft diagonal gradient with a translucent disc on top, to give the dither something to chew on
fn sample_image(width: i32, height: i32) -> RgbaImage {
    let dark = LinSrgb::new(0.02f32, 0.02, 0.05);
    let light = LinSrgb::new(0.95f32, 0.9, 0.8);
    let (cx, cy, r) = (width / 2, height / 2, width.min(height) / 3);

    RgbaImage::from_fn(width, height, |x, y| {
        let t = (x + y) as f32 / (width + height).max(1) as f32;
        let (dx, dy) = (x - cx, y - cy);
        if dx * dx + dy * dy < r * r {
            // half transparent black
            0x80000000
        } else {
            graphics::from_srgb(Srgb::<f32>::from_linear(dark.mix(light, t)).into_format())
        }
    })
}

/// Renders one frame onto the emulated panel
fn render_frame(config: &ViewerConfig, caption: Option<&TextRun>) -> eyre::Result<GrayBuf> {
    let mut panel = GrayBuf::new(config.width, config.height, config.depth);
    panel.clear(panel.depth().max_level() as Color);

    // photo area: composited in true color first, then packed down
    let photo = sample_image(64, 48);
    let (w, h) = (config.width - 40, (config.width - 40) * 3 / 4);
    let mut staging = ColorBuf::new(w, h);
    staging.clear(graphics::WHITE);
    staging
        .draw_image(&photo, 0, 0, w, h)
        .wrap_err("compositing sample image")?;

    panel.fill_rect(20, 20, 20 + w, 20 + h, 0);
    staging.draw_to(&mut panel, 20, 20);

    // the same image again, dithered straight into the panel at its natural size
    panel
        .draw_image(&photo, 20, 40 + h, photo.width(), photo.height())
        .wrap_err("drawing thumbnail")?;

    if let Some(caption) = caption {
        let top = config.height - caption.size().height - 20;
        panel.fill_rect(0, top, config.width, config.height, 0);
        caption.draw_at(&mut panel, Position::new(20, top));
    }

    if config.dither_to_bitmap {
        panel.convert_to_bitmap(true);
    }
    Ok(panel)
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    let config = ViewerConfig::from_env();
    log::info!("starting viewer with {config:?}");

    let caption = match &config.font_path {
        Some(path) => {
            let typeface = Typeface::from_path(path)?;
            Some(
                TextRun::new(typeface.font(), "Sphinx of black quartz, judge my vow", config.font_size)
                    .with_foreground(graphics::WHITE),
            )
        }
        None => {
            log::info!("no INKBUF_FONT set, skipping caption");
            None
        }
    };
    let panel = render_frame(&config, caption.as_ref())?;
    let frame = panel.to_rgb(None);

    let event_loop = EventLoop::new()
        .map_err(|err| eyre!("{err}"))
        .wrap_err("creating event loop")?;
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::PhysicalSize::new(
            config.width as u32,
            config.height as u32,
        ))
        .with_resizable(false)
        .build(&event_loop)
        .map_err(|err| eyre!("{err}"))
        .wrap_err("creating window")?;

    let context = unsafe { softbuffer::Context::new(&window) }
        .map_err(|err| eyre!("{err}"))
        .wrap_err("creating softbuffer context")?;
    let mut surface = unsafe { softbuffer::Surface::new(&context, &window) }
        .map_err(|err| eyre!("{err}"))
        .wrap_err("creating softbuffer surface")?;

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                    WindowEvent::CloseRequested => elwt.exit(),

                    WindowEvent::RedrawRequested => {
                        let size = window.inner_size();
                        let (Some(width), Some(height)) =
                            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                        else {
                            return;
                        };
                        if let Err(err) = surface.resize(width, height) {
                            log::error!("resizing surface: {err}");
                            return;
                        }

                        let mut buffer = match surface.buffer_mut() {
                            Ok(buffer) => buffer,
                            Err(err) => {
                                log::error!("acquiring surface buffer: {err}");
                                return;
                            }
                        };
                        buffer.fill(0);

                        // panel rows may be narrower or shorter than the window
                        let (win_w, win_h) = (size.width as usize, size.height as usize);
                        let panel_w = panel.width() as usize;
                        for (y, src) in frame.chunks(panel_w.max(1)).take(win_h).enumerate() {
                            let n = panel_w.min(win_w);
                            buffer[y * win_w..y * win_w + n].copy_from_slice(&src[..n]);
                        }

                        if let Err(err) = buffer.present() {
                            log::error!("presenting frame: {err}");
                        }
                    }
                    _ => (),
                },
                _ => (),
            }
        })
        .map_err(|err| eyre!("{err}"))
        .wrap_err("running event loop")?;

    Ok(())
}
