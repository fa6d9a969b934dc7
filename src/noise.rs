use super::rand::Random;
use super::raster::{pack, unpack, Raster};

/// Adds film grain: each pixel gets one random offset in `[0, 255 * intensity)`, rounded to the
/// nearest integer, added equally to its red, green, and blue channels so hue is kept while
/// luminance jitters. Channels saturate at the pixel's alpha (255 for an opaque raster); alpha
/// itself is untouched.
///
/// One deviate is drawn per pixel, in row-major order. An `intensity` of zero (or less, or NaN)
/// leaves the raster and the random source untouched.
pub fn add_noise(raster: &mut Raster, intensity: f64, rng: &mut impl Random) {
    if !(intensity > 0.0) {
        return;
    }
    let scale = 255.0 * intensity;
    for word in raster.words_mut() {
        let n = (rng.rnd() * scale).round();
        let [r, g, b, a] = unpack(*word);
        let bump = |c: u8| (f64::from(c) + n).min(f64::from(a)) as u8;
        *word = pack([bump(r), bump(g), bump(b), a]);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::ColorSpec;
    use crate::rand::{Rng, Sequence};

    fn gray(w: i32, h: i32, level: u8) -> Raster {
        let mut raster = Raster::new(w, h).expect("non-empty");
        raster.fill(ColorSpec::new(level, level, level));
        raster
    }

    #[test]
    fn test_zero_intensity_is_noop() {
        let mut raster = gray(9, 4, 77);
        raster.words_mut()[5] = pack([1, 2, 3, 255]);
        let before = raster.words().to_vec();
        let mut rng = Sequence::new(vec![0.9]);
        add_noise(&mut raster, 0.0, &mut rng);
        add_noise(&mut raster, -0.5, &mut rng);
        add_noise(&mut raster, f64::NAN, &mut rng);
        assert_eq!(raster.words(), &before[..]);
        assert_eq!(rng.drawn(), 0);
    }

    #[test]
    fn test_same_offset_on_every_channel() {
        let mut raster = Raster::new(3, 1).expect("non-empty");
        raster.fill(ColorSpec::new(10, 20, 30));
        let mut seq = Sequence::new(vec![0.0, 0.5, 0.2]);
        add_noise(&mut raster, 0.4, &mut seq);
        // Offsets: 0, round(51.0), round(20.4).
        assert_eq!(raster.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(raster.pixel(1, 0), [61, 71, 81, 255]);
        assert_eq!(raster.pixel(2, 0), [30, 40, 50, 255]);
        assert_eq!(seq.drawn(), 3);
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let mut raster = Raster::new(2, 1).expect("non-empty");
        raster.fill(ColorSpec::new(250, 128, 0));
        add_noise(&mut raster, 1.0, &mut Sequence::new(vec![0.99]));
        assert_eq!(raster.pixel(0, 0), [255, 255, 252, 255]);
        assert_eq!(raster.pixel(1, 0), [255, 255, 252, 255]);
    }

    #[test]
    fn test_never_darkens_and_stays_opaque() {
        let mut raster = gray(32, 32, 100);
        add_noise(&mut raster, 0.3, &mut Rng::from_seed(b"grain"));
        assert!(raster.is_opaque());
        let mut max = 0;
        for &word in raster.words() {
            let [r, g, b, _] = unpack(word);
            assert_eq!((r, r), (g, b));
            assert!((100..=177).contains(&r), "channel {}", r);
            max = max.max(r);
        }
        assert!(max > 150, "no visible grain (max {})", max);
    }

    #[test]
    fn test_translucent_pixels_stay_premultiplied() {
        let mut raster = Raster::new(1, 1).expect("non-empty");
        raster.words_mut()[0] = pack([60, 60, 60, 100]);
        add_noise(&mut raster, 1.0, &mut Sequence::new(vec![0.5]));
        assert_eq!(unpack(raster.words()[0]), [100, 100, 100, 100]);
    }
}
