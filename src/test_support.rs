use std::io::{Cursor, Write};

use zip::{ZipWriter, write::SimpleFileOptions};

use crate::archive::EpubArchive;

pub fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
	let mut cursor = Cursor::new(Vec::new());
	{
		let mut writer = ZipWriter::new(&mut cursor);
		for (name, contents) in entries {
			writer.start_file(*name, SimpleFileOptions::default()).expect("start file");
			writer.write_all(contents.as_bytes()).expect("write file");
		}
		writer.finish().expect("finish zip");
	}
	cursor.into_inner()
}

pub fn build_archive(entries: &[(&str, &str)]) -> EpubArchive<Cursor<Vec<u8>>> {
	EpubArchive::new(Cursor::new(build_zip(entries))).expect("open zip")
}

pub fn xhtml(body: &str) -> String {
	format!(
		"<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\" \
		 xmlns:epub=\"http://www.idpf.org/2007/ops\"><head><title>t</title></head><body>{body}</body></html>"
	)
}
