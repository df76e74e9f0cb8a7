use memfs::{FileType, FsConfig, FsError, Volume};

pub fn main() -> Result<(), FsError> {
    let mut volume = Volume::new();
    let fs = volume.mkfs(FsConfig::builder().with_descriptors(16).build())?;

    fs.create("123.txt")?;
    let h = fs.open("123.txt")?;
    fs.write(h, 35)?;
    println!("read: {:?}", fs.read(h, 38)?);

    fs.seek(h, 30)?;
    println!("read at 30: {:?}", fs.read(h, 10)?);

    fs.truncate("123.txt", 40)?;
    fs.seek(h, 0)?;
    println!("after truncate: {:?}", fs.read(h, 100)?);
    fs.close(h)?;

    fs.link("123.txt", "123-link.txt")?;
    fs.mkdir("/folder1")?;
    fs.symlink("/folder1/up", "..")?;
    for entry in fs.list() {
        match entry.file_type {
            FileType::Symlink => println!(
                "{} -> {}",
                entry.name,
                entry.target.unwrap_or_default()
            ),
            _ => println!("{} ({})", entry.name, entry.file_type),
        }
    }

    fs.cd("/folder1/up/folder1")?;
    println!("pwd: {}", fs.pwd());
    Ok(())
}
