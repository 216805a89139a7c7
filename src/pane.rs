#![forbid(unsafe_code)]

use tracing::debug;

use crate::fs_ops;
use crate::model::FsError;
use crate::text::Text;

#[derive(Debug, Clone)]
pub struct Line {
    pub text: Text,
    pub is_dir: bool,
}

/// One visible directory listing: entries, selection, viewport window and
/// the directory/file partition boundary. The first screen row of the pane
/// is reserved for the title, so the viewport holds `height - 1` lines.
#[derive(Debug)]
pub struct Pane {
    pub cwd: Text,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub current_line: usize,
    pub num_lines: usize,
    pub view_start: usize,
    pub view_end: usize,
    pub files_start: usize,
    pub entries: Vec<Line>,
}

impl Pane {
    pub fn new(x: u16, y: u16, width: u16, height: u16, cwd: Text) -> Self {
        Self {
            cwd,
            x,
            y,
            width,
            height,
            current_line: 0,
            num_lines: 0,
            view_start: 0,
            view_end: (height as usize).saturating_sub(1),
            files_start: 0,
            entries: Vec::new(),
        }
    }

    pub fn view_height(&self) -> usize {
        (self.height as usize).saturating_sub(1)
    }

    pub fn lines(&self) -> &[Line] {
        &self.entries[..self.num_lines]
    }

    pub fn current(&self) -> Option<&Line> {
        self.lines().get(self.current_line)
    }

    /// Reload the listing from `cwd`. Existing text slots are rewritten in
    /// place by index; the backing array only grows when the listing does.
    pub fn load(&mut self) -> Result<(), FsError> {
        let listing = fs_ops::list_dir(&self.cwd.to_path_buf())?;

        self.num_lines = 0;
        self.current_line = 0;
        for (name, is_dir) in listing {
            let index = self.num_lines;
            if index < self.entries.len() {
                self.entries[index].text.replace(name.as_bytes());
                self.entries[index].is_dir = is_dir;
            } else {
                self.entries.push(Line { text: Text::from(name.as_bytes()), is_dir });
            }
            self.num_lines += 1;
        }

        self.view_start = 0;
        self.view_end = self.view_height();

        // Partition directories in front of files. Stable for directories,
        // not for files; the sorts below restore a total order.
        let mut dir_end = 0;
        for index in 0..self.num_lines {
            if self.entries[index].is_dir {
                self.entries.swap(dir_end, index);
                dir_end += 1;
            }
        }
        self.files_start = dir_end;

        insertion_sort(&mut self.entries[..dir_end]);
        insertion_sort(&mut self.entries[dir_end..self.num_lines]);

        debug_assert!(self.entries[..self.files_start].iter().all(|l| l.is_dir));
        debug_assert!(self.entries[self.files_start..self.num_lines].iter().all(|l| !l.is_dir));
        debug!(cwd = %self.cwd, lines = self.num_lines, "loaded directory");
        Ok(())
    }

    /// Translate the viewport. Hard boundary check, not a clamp: out-of-range
    /// deltas leave the window untouched and report failure.
    pub fn scroll(&mut self, delta: isize) -> bool {
        let new_start = self.view_start as isize + delta;
        let new_end = self.view_end as isize + delta;
        if new_start >= 0 && new_end as usize <= self.num_lines {
            self.view_start = new_start as usize;
            self.view_end = new_end as usize;
            true
        } else {
            false
        }
    }

    /// Move the selection to `line`, scrolling just far enough to bring it
    /// into the viewport. If the scroll is rejected at a boundary the window
    /// stays where it was.
    pub fn jump_to_line(&mut self, line: usize) {
        self.current_line = line;
        if line < self.view_start {
            self.scroll(line as isize - self.view_start as isize);
        } else if line >= self.view_end {
            self.scroll(line as isize - self.view_end as isize + 1);
        }
    }

    // Cyclic j: past the last line wraps to the top and resets the window.
    pub fn select_next(&mut self) {
        if self.num_lines == 0 {
            return;
        }
        self.current_line = (self.current_line + 1) % self.num_lines;
        if self.current_line >= self.view_end {
            self.scroll(1);
        }
        if self.current_line == 0 {
            self.jump_to_line(0);
        }
    }

    // Cyclic k: before line 0 wraps to the tail, repositioning the window
    // when the listing is taller than one viewport.
    pub fn select_prev(&mut self) {
        if self.num_lines == 0 {
            return;
        }
        if self.current_line == 0 {
            self.jump_to_line(self.num_lines - 1);
        } else {
            self.current_line -= 1;
        }
        if self.current_line < self.view_start {
            self.scroll(-1);
        }
    }

    pub fn push_dir(&mut self, name: &Text) {
        self.cwd.push(b'/');
        self.cwd.concat(name);
    }

    /// Strip the last `/`-delimited segment from `cwd`. At the filesystem
    /// root this degrades to a reload of `/`.
    pub fn pop_dir(&mut self) -> bool {
        while let Some(byte) = self.cwd.pop() {
            if byte == b'/' {
                if self.cwd.is_empty() {
                    self.cwd.push(b'/');
                }
                return true;
            }
        }
        false
    }
}

// Stable, allocation-free, and fine at directory-listing sizes.
fn insertion_sort(lines: &mut [Line]) {
    for i in 1..lines.len() {
        let mut j = i;
        while j > 0 && lines[j].text.alpha_lt(&lines[j - 1].text) {
            lines.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pane_at(dir: &std::path::Path, height: u16) -> Pane {
        Pane::new(0, 0, 40, height, Text::from(dir.to_string_lossy().as_ref()))
    }

    fn names(pane: &Pane) -> Vec<String> {
        pane.lines().iter().map(|l| l.text.to_string()).collect()
    }

    #[test]
    fn load_partitions_and_sorts() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.txt"), b"").unwrap();
        fs::write(tmp.path().join("a.txt"), b"").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();

        let mut pane = pane_at(tmp.path(), 10);
        pane.load().unwrap();

        assert_eq!(names(&pane), ["sub", "a.txt", "b.txt"]);
        assert_eq!(pane.files_start, 1);
        assert_eq!(pane.current_line, 0);
        assert_eq!(pane.view_start, 0);
        assert_eq!(pane.view_end, 9);
    }

    #[test]
    fn load_sorts_case_insensitively_per_partition() {
        let tmp = TempDir::new().unwrap();
        for name in ["Zeta.txt", "alpha.txt", "Beta.txt"] {
            fs::write(tmp.path().join(name), b"").unwrap();
        }
        for name in ["src", "Docs"] {
            fs::create_dir(tmp.path().join(name)).unwrap();
        }

        let mut pane = pane_at(tmp.path(), 10);
        pane.load().unwrap();

        assert_eq!(names(&pane), ["Docs", "src", "alpha.txt", "Beta.txt", "Zeta.txt"]);
        assert_eq!(pane.files_start, 2);
    }

    #[test]
    fn reload_reuses_slots() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("one.txt"), b"").unwrap();
        fs::write(tmp.path().join("two.txt"), b"").unwrap();

        let mut pane = pane_at(tmp.path(), 10);
        pane.load().unwrap();
        let slots = pane.entries.len();

        fs::remove_file(tmp.path().join("two.txt")).unwrap();
        pane.load().unwrap();

        assert_eq!(pane.num_lines, 1);
        assert_eq!(pane.entries.len(), slots);
        assert_eq!(names(&pane), ["one.txt"]);
    }

    #[test]
    fn scroll_rejects_out_of_range() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            fs::write(tmp.path().join(format!("f{i}.txt")), b"").unwrap();
        }
        let mut pane = pane_at(tmp.path(), 4); // viewport of 3
        pane.load().unwrap();

        assert!(!pane.scroll(-1));
        assert_eq!((pane.view_start, pane.view_end), (0, 3));
        assert!(pane.scroll(2));
        assert_eq!((pane.view_start, pane.view_end), (2, 5));
        assert!(!pane.scroll(1));
        assert_eq!((pane.view_start, pane.view_end), (2, 5));
    }

    #[test]
    fn jump_scrolls_selection_into_view() {
        let tmp = TempDir::new().unwrap();
        for i in 0..9 {
            fs::write(tmp.path().join(format!("f{i}.txt")), b"").unwrap();
        }
        let mut pane = pane_at(tmp.path(), 4); // viewport of 3
        pane.load().unwrap();

        pane.jump_to_line(7);
        assert_eq!(pane.current_line, 7);
        assert!(pane.view_start <= 7 && 7 < pane.view_end);

        pane.jump_to_line(1);
        assert_eq!((pane.view_start, pane.view_end), (1, 4));
    }

    #[test]
    fn cyclic_next_wraps_to_top() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            fs::write(tmp.path().join(format!("f{i}.txt")), b"").unwrap();
        }
        let mut pane = pane_at(tmp.path(), 4);
        pane.load().unwrap();

        for _ in 0..4 {
            pane.select_next();
        }
        assert_eq!(pane.current_line, 4);
        pane.select_next();
        assert_eq!(pane.current_line, 0);
        assert_eq!(pane.view_start, 0);
    }

    #[test]
    fn cyclic_prev_wraps_to_tail() {
        let tmp = TempDir::new().unwrap();
        for i in 0..6 {
            fs::write(tmp.path().join(format!("f{i}.txt")), b"").unwrap();
        }
        let mut pane = pane_at(tmp.path(), 4); // viewport of 3, listing of 6
        pane.load().unwrap();

        pane.select_prev();
        assert_eq!(pane.current_line, 5);
        assert_eq!((pane.view_start, pane.view_end), (3, 6));
    }

    #[test]
    fn push_and_pop_dir() {
        let mut pane = Pane::new(0, 0, 10, 10, Text::from("/home/user"));
        pane.push_dir(&Text::from("projects"));
        assert_eq!(pane.cwd.to_string(), "/home/user/projects");
        assert!(pane.pop_dir());
        assert_eq!(pane.cwd.to_string(), "/home/user");
        assert!(pane.pop_dir());
        assert_eq!(pane.cwd.to_string(), "/home");
        assert!(pane.pop_dir());
        assert_eq!(pane.cwd.to_string(), "/");
    }

    #[test]
    fn pop_dir_at_root_stays_at_root() {
        let mut pane = Pane::new(0, 0, 10, 10, Text::from("/"));
        assert!(pane.pop_dir());
        assert_eq!(pane.cwd.to_string(), "/");
    }
}
