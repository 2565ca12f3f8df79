use rasterkit::{
    image::{Image, ImageSize},
    imgproc::selection::SelectionError,
    io::functional::write_image_rgb8,
    Operation, Session, SessionConfig, SessionError,
};

fn solid(width: usize, height: usize, value: u8) -> Image<u8, 3> {
    Image::from_size_val(ImageSize { width, height }, value).unwrap()
}

#[test]
fn brightness_on_gray_file() -> Result<(), SessionError> {
    let tmp_dir = tempfile::tempdir().map_err(rasterkit::io::IoError::from)?;
    let path = tmp_dir.path().join("gray.png");
    write_image_rgb8(&path, &solid(4, 4, 128))?;

    let mut session = Session::open(&path, false)?;
    session.apply(&Operation::Brightness(50))?;
    assert!(session.processed()?.as_slice().iter().all(|&v| v == 178));

    // the slider is relative to the original, and saturates
    let mut bright = Session::new(solid(4, 4, 230));
    bright.apply(&Operation::Brightness(50))?;
    bright.apply(&Operation::Brightness(50))?;
    assert!(bright.processed()?.as_slice().iter().all(|&v| v == 255));
    Ok(())
}

#[test]
fn opening_removes_isolated_speck() -> Result<(), SessionError> {
    let mut image = solid(7, 7, 0);
    let centre = (3 * 7 + 3) * 3;
    image.as_slice_mut()[centre..centre + 3].copy_from_slice(&[255, 255, 255]);

    let mut session = Session::new(image);
    session.apply(&Operation::Erode)?;
    assert!(session.processed()?.as_slice().iter().all(|&v| v == 0));
    session.apply(&Operation::Dilate)?;
    assert!(session.processed()?.as_slice().iter().all(|&v| v == 0));
    Ok(())
}

#[test]
fn collapsed_crop_keeps_buffer() -> Result<(), SessionError> {
    let data = (0..40 * 20 * 3).map(|i| (i % 256) as u8).collect();
    let image = Image::<u8, 3>::new(
        ImageSize {
            width: 40,
            height: 20,
        },
        data,
    )?;
    let mut session = Session::new(image);
    session.apply(&Operation::Negative)?;
    let before = session.processed()?.clone();

    let mut region = session.crop_region()?;
    let r = region.rect();
    region.pointer_down(r.right, r.bottom);
    region.pointer_move(r.left, r.top);
    region.pointer_up();

    assert!(matches!(
        session.commit_crop(&region),
        Err(SessionError::Selection(SelectionError::EmptyRegion))
    ));
    assert_eq!(session.processed()?, &before);

    // the default region crops to half the image
    session.commit_crop(&session.crop_region()?)?;
    let cropped = session.processed()?;
    assert!(cropped.cols() < 40 && cropped.rows() < 20);
    Ok(())
}

#[test]
fn collinear_quad_is_degenerate() -> Result<(), SessionError> {
    let mut session = Session::new(solid(20, 20, 90));
    let before = session.processed()?.clone();

    let mut quad = session.perspective_quad()?;
    for (x, y) in [(1, 1), (5, 5), (10, 10), (15, 15)] {
        quad.push(x, y);
    }
    assert!(matches!(
        session.rectify(&mut quad),
        Err(SessionError::Selection(SelectionError::DegenerateGeometry))
    ));
    assert_eq!(session.processed()?, &before);
    assert!(quad.points().is_empty());

    for (x, y) in [(2, 2), (17, 3), (16, 16), (3, 15)] {
        quad.push(x, y);
    }
    session.rectify(&mut quad)?;
    let out = session.processed()?;
    assert!(out.as_slice().iter().all(|&v| v == 90));
    Ok(())
}

#[test]
fn frequency_filter_yields_gray() -> Result<(), SessionError> {
    let data = (0..32 * 32)
        .flat_map(|i| [(i % 32 * 8) as u8, (i / 32 * 8) as u8, 60])
        .collect();
    let image = Image::<u8, 3>::new(
        ImageSize {
            width: 32,
            height: 32,
        },
        data,
    )?;
    let config = SessionConfig::default();
    let mut session = Session::with_config(config.clone());
    session.load(image);

    for name in SessionConfig::FREQUENCY_FILTERS {
        let filter = config.frequency_filter(name).unwrap();
        session.apply(&Operation::Frequency(filter))?;
        for p in session.processed()?.as_slice().chunks_exact(3) {
            assert!(p[0] == p[1] && p[1] == p[2]);
        }
        session.reset()?;
    }
    Ok(())
}

#[test]
fn save_and_reopen() -> Result<(), SessionError> {
    let tmp_dir = tempfile::tempdir().map_err(rasterkit::io::IoError::from)?;
    let path = tmp_dir.path().join("out.png");

    let mut session = Session::new(solid(5, 3, 40));
    session.apply(&Operation::Rotate90)?;
    session.save(&path)?;

    let reopened = Session::open(&path, true)?;
    let image = reopened.original()?;
    assert_eq!(
        image.size(),
        ImageSize {
            width: 3,
            height: 5
        }
    );
    assert!(image.as_slice().iter().all(|&v| v == 40));

    assert!(matches!(
        Session::open(tmp_dir.path().join("missing.png"), false),
        Err(SessionError::Io(_))
    ));
    Ok(())
}
