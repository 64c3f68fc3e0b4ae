use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut};
use imageproc::rect::Rect;

const INK: Rgb<u8> = Rgb([20, 20, 20]);

fn main() -> anyhow::Result<()> {
    let mut img = RgbImage::from_pixel(400, 160, Rgb([250, 248, 240]));

    // "I": a single stroke
    draw_filled_rect_mut(&mut img, Rect::at(30, 30).of_size(12, 90), INK);

    // "O": a ring, its hole is not a separate segment
    for r in 30..40 {
        draw_hollow_circle_mut(&mut img, (110, 75), r, INK);
    }

    // "i": stem and dot come out as two partial segments
    draw_filled_rect_mut(&mut img, Rect::at(180, 60).of_size(10, 60), INK);
    draw_filled_circle_mut(&mut img, (185, 40), 7, INK);

    // "T": two touching bars form one segment
    draw_filled_rect_mut(&mut img, Rect::at(230, 30).of_size(60, 10), INK);
    draw_filled_rect_mut(&mut img, Rect::at(255, 40).of_size(10, 80), INK);

    // "rn": two glyphs touching, tag them as merged
    draw_filled_rect_mut(&mut img, Rect::at(320, 70).of_size(8, 50), INK);
    draw_filled_rect_mut(&mut img, Rect::at(328, 70).of_size(40, 8), INK);
    draw_filled_rect_mut(&mut img, Rect::at(360, 70).of_size(8, 50), INK);

    // speckles below the default minimum area
    for (x, y) in [(60, 140), (150, 20), (300, 145)] {
        draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(2, 2), INK);
    }

    img.save("glyph_sheet.png")?;
    println!("Created glyph_sheet.png (400x160 synthetic glyph sheet)");
    Ok(())
}
