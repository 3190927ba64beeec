use anyhow::Error;
use ndarray::Array4;
use opencv::core::{Mat, MatTraitConst, Size, Vec3b};
use opencv::imgproc::{COLOR_BGR2RGB, cvt_color, INTER_LINEAR, resize};

/// bgr_to_rgb converts a decoded video frame to the channel order the landmark models expect.
pub fn bgr_to_rgb(frame: &Mat) -> Result<Mat, Error> {
    let mut rgb = Mat::default();
    cvt_color(frame, &mut rgb, COLOR_BGR2RGB, 0)?;
    Ok(rgb)
}

/// image_to_tensor resizes the image and packs it as a normalized `[1, 3, H, W]` tensor.
///
/// # Arguments
/// * `img` - 8-bit three channel OpenCV matrix
/// * `imsize` - target `(width, height)`
/// * `mean` - value subtracted from every pixel
/// * `scale` - factor applied after the mean is subtracted
///
/// # Returns
/// * `Result<Array4<f32>, Error>`
pub fn image_to_tensor(img: &Mat, imsize: (i32, i32), mean: f32, scale: f32) -> Result<Array4<f32>, Error> {
    let mut img_resized = Mat::default();
    resize(
        img,
        &mut img_resized,
        Size::new(imsize.0, imsize.1),
        0.0,
        0.0,
        INTER_LINEAR,
    )?;

    let width = imsize.0 as usize;
    let height = imsize.1 as usize;
    let mut im_tensor = Array4::<f32>::zeros((1, 3, height, width));

    for y in 0..height {
        for x in 0..width {
            let pixel = img_resized.at_2d::<Vec3b>(y as i32, x as i32)?;
            for c in 0..3 {
                im_tensor[[0, c, y, x]] = (pixel[c] as f32 - mean) * scale;
            }
        }
    }

    Ok(im_tensor)
}
